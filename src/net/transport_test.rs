use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::state::session::{SessionRecord, SessionState};
use crate::storage::MemoryStorage;
use crate::storage::credentials::PersistedCredentialStore;

fn bridge() -> SessionBridge {
    let persistence = PersistedCredentialStore::plain(Arc::new(MemoryStorage::new()));
    SessionBridge::new(SessionState::restore(persistence, "user_info"))
}

#[test]
fn join_url_handles_slashes() {
    assert_eq!(join_url("/api", "/users"), "/api/users");
    assert_eq!(join_url("https://x.test/api/", "users"), "https://x.test/api/users");
}

#[test]
fn url_for_uses_trimmed_base() {
    let transport = HttpTransport::new("https://x.test/api/", LateBound::unbound());
    assert_eq!(transport.url_for(&ApiRequest::get("/me", json!({}))), "https://x.test/api/me");
}

#[test]
fn query_pairs_flatten_scalars_and_skip_nulls() {
    let mut pairs = query_pairs(&json!({ "q": "al", "page": 2, "all": true, "skip": null }));
    pairs.sort();
    assert_eq!(
        pairs,
        vec![
            ("all".to_owned(), "true".to_owned()),
            ("page".to_owned(), "2".to_owned()),
            ("q".to_owned(), "al".to_owned()),
        ]
    );
    assert!(query_pairs(&json!([1, 2])).is_empty());
}

#[test]
fn method_placement_of_params() {
    assert!(HttpMethod::Get.uses_query());
    assert!(HttpMethod::Delete.uses_query());
    assert!(!HttpMethod::Post.uses_query());
    assert!(!HttpMethod::Put.uses_query());
    assert_eq!(ApiRequest::put("/x", json!({})).method.as_str(), "PUT");
}

#[test]
fn bearer_token_comes_from_bridge() {
    let slot = LateBound::unbound();
    let transport = HttpTransport::new("/api", slot.clone());
    assert_eq!(transport.bearer_token(), None);

    let bridge = bridge();
    slot.bind(bridge.clone());
    assert_eq!(transport.bearer_token(), None);

    bridge.login(SessionRecord::with_token("abc"));
    assert_eq!(transport.bearer_token().as_deref(), Some("abc"));
}

#[test]
fn parse_body_handles_empty_and_invalid() {
    assert_eq!(parse_body("  "), Ok(Value::Null));
    assert_eq!(parse_body(r#"{"ok":true}"#), Ok(json!({ "ok": true })));
    assert!(parse_body("<html>").is_err());
}

#[test]
fn error_message_prefers_json_fields() {
    assert_eq!(error_message(r#"{"message":"expired"}"#), "expired");
    assert_eq!(error_message(r#"{"error":"denied"}"#), "denied");
    assert_eq!(error_message(" Bad Gateway \n"), "Bad Gateway");
}
