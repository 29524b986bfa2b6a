use super::*;

#[test]
fn env_bool_parses_common_spellings() {
    unsafe {
        std::env::set_var("AUTH_TEST_FLAG", "1");
    }
    assert_eq!(env_bool("AUTH_TEST_FLAG"), Some(true));
    unsafe {
        std::env::set_var("AUTH_TEST_FLAG", "Off");
    }
    assert_eq!(env_bool("AUTH_TEST_FLAG"), Some(false));
    unsafe {
        std::env::set_var("AUTH_TEST_FLAG", "maybe");
    }
    assert_eq!(env_bool("AUTH_TEST_FLAG"), None);
    unsafe {
        std::env::remove_var("AUTH_TEST_FLAG");
    }
    assert_eq!(env_bool("AUTH_TEST_FLAG"), None);
}

#[test]
fn session_cookie_is_http_only_and_scoped_to_root() {
    let cookie = session_cookie("token-value".into(), true);
    assert_eq!(cookie.name(), COOKIE_NAME);
    assert_eq!(cookie.value(), "token-value");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
}

#[test]
fn clear_cookie_expires_immediately() {
    let cookie = clear_session_cookie(false);
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
}
