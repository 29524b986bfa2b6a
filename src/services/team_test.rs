use super::*;
use crate::services::session::SessionUser;
use crate::state::test_helpers;

fn session_user(role: Role) -> SessionUser {
    SessionUser { id: Uuid::new_v4(), email: "ops@example.com".into(), name: "Ops".into(), role }
}

#[test]
fn role_round_trips_through_strings() {
    for role in [Role::Viewer, Role::Editor, Role::Admin] {
        assert_eq!(Role::from_str(role.as_str()), Some(role));
    }
    assert_eq!(Role::from_str("owner"), None);
}

#[test]
fn role_ordering_is_least_to_most_privileged() {
    assert!(Role::Viewer < Role::Editor);
    assert!(Role::Editor < Role::Admin);
}

#[test]
fn ensure_role_admits_equal_or_higher() {
    assert!(ensure_role(&session_user(Role::Editor), Role::Editor).is_ok());
    assert!(ensure_role(&session_user(Role::Admin), Role::Editor).is_ok());
    assert!(ensure_role(&session_user(Role::Viewer), Role::Viewer).is_ok());
}

#[test]
fn ensure_role_rejects_lower() {
    let err = ensure_role(&session_user(Role::Viewer), Role::Editor).unwrap_err();
    assert!(matches!(err, TeamError::Forbidden(_)));
    assert!(ensure_role(&session_user(Role::Editor), Role::Admin).is_err());
}

#[tokio::test]
async fn update_member_blocks_self_demotion_before_touching_db() {
    // The lazy test pool has no live server behind it: reaching the guard
    // proves the lockout check fires before any query.
    let state = test_helpers::test_app_state();
    let actor = Uuid::new_v4();

    let patch = MemberPatch { role: Some(Role::Editor), ..MemberPatch::default() };
    let err = update_member(&state.pool, actor, actor, patch).await.unwrap_err();
    assert!(matches!(err, TeamError::SelfLockout));

    let patch = MemberPatch { active: Some(false), ..MemberPatch::default() };
    let err = update_member(&state.pool, actor, actor, patch).await.unwrap_err();
    assert!(matches!(err, TeamError::SelfLockout));
}

#[tokio::test]
async fn update_member_allows_self_rename() {
    // Renaming yourself is fine; with the lazy pool this fails later at the
    // database layer, not at the lockout guard.
    let state = test_helpers::test_app_state();
    let actor = Uuid::new_v4();

    let patch = MemberPatch { name: Some("New Name".into()), ..MemberPatch::default() };
    let err = update_member(&state.pool, actor, actor, patch).await.unwrap_err();
    assert!(matches!(err, TeamError::Database(_)));
}
