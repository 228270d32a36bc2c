use std::sync::Arc;

use super::*;
use crate::state::session::{SessionRecord, SessionState};
use crate::storage::MemoryStorage;
use crate::storage::credentials::PersistedCredentialStore;

fn bridge() -> SessionBridge {
    let persistence = PersistedCredentialStore::plain(Arc::new(MemoryStorage::new()));
    SessionBridge::new(SessionState::restore(persistence, "user_info"))
}

// =============================================================
// NavigationArgs
// =============================================================

#[test]
fn navigation_args_strip_leading_question_mark() {
    let nav = NavigationArgs::new("/protected", "?id=5");
    assert_eq!(nav.search, "id=5");
    assert_eq!(nav.location(), "/protected?id=5");
}

#[test]
fn navigation_args_parse_location() {
    assert_eq!(NavigationArgs::parse("/a?b=1"), NavigationArgs::new("/a", "b=1"));
    assert_eq!(NavigationArgs::parse("/a").location(), "/a");
}

// =============================================================
// Guard decisions
// =============================================================

#[test]
fn protected_route_while_logged_out_redirects_with_original_target() {
    let guard = RouteGuard::for_bridge(bridge());
    let result = guard.check(&RoutePolicy::protected(), &NavigationArgs::parse("/protected?id=5"));
    assert_eq!(
        result,
        Err(Redirect { location: "/login?redirect=%2Fprotected%3Fid%3D5".to_owned() })
    );
}

#[test]
fn protected_route_while_logged_in_is_allowed() {
    let bridge = bridge();
    bridge.login(SessionRecord::with_token("abc"));
    let guard = RouteGuard::for_bridge(bridge);
    assert_eq!(guard.check(&RoutePolicy::protected(), &NavigationArgs::parse("/protected")), Ok(()));
}

#[test]
fn public_route_is_always_allowed() {
    let bridge = bridge();
    let guard = RouteGuard::for_bridge(bridge.clone());
    let nav = NavigationArgs::parse("/about");
    let policy = RoutePolicy::public().with_meta("title", serde_json::json!("About"));

    assert_eq!(guard.check(&policy, &nav), Ok(()));
    bridge.login(SessionRecord::with_token("abc"));
    assert_eq!(guard.check(&policy, &nav), Ok(()));

    let unbound = RouteGuard::new(LateBound::unbound(), "/login");
    assert_eq!(unbound.check(&policy, &nav), Ok(()));
}

#[test]
fn guard_follows_session_changes_between_navigations() {
    let bridge = bridge();
    let guard = RouteGuard::for_bridge(bridge.clone());
    let nav = NavigationArgs::parse("/boards");

    assert!(guard.check(&RoutePolicy::protected(), &nav).is_err());
    bridge.login(SessionRecord::with_token("abc"));
    assert!(guard.check(&RoutePolicy::protected(), &nav).is_ok());
    bridge.logout();
    assert!(guard.check(&RoutePolicy::protected(), &nav).is_err());
}

#[test]
fn guard_does_not_mutate_session() {
    let bridge = bridge();
    let guard = RouteGuard::for_bridge(bridge.clone());
    let _ = guard.check(&RoutePolicy::protected(), &NavigationArgs::parse("/x"));
    assert_eq!(bridge.current(), SessionRecord::default());
}

#[test]
fn unbound_bridge_fails_safe_to_redirect() {
    let slot = LateBound::unbound();
    let guard = RouteGuard::new(slot.clone(), "/signin");
    let nav = NavigationArgs::parse("/boards");

    let redirect = guard.check(&RoutePolicy::protected(), &nav).unwrap_err();
    assert_eq!(redirect.location, "/signin?redirect=%2Fboards");

    let bridge = bridge();
    bridge.login(SessionRecord::with_token("abc"));
    slot.bind(bridge);
    assert_eq!(guard.check(&RoutePolicy::protected(), &nav), Ok(()));
}
