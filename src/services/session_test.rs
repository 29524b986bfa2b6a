use super::*;

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_is_unique_across_calls() {
    assert_ne!(generate_token(), generate_token());
}

#[test]
fn bytes_to_hex_encodes_lowercase() {
    assert_eq!(bytes_to_hex(&[0x00, 0xff, 0x0a]), "00ff0a");
    assert_eq!(bytes_to_hex(&[]), "");
}
