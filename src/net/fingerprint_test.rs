use serde_json::json;

use super::*;

#[test]
fn key_order_does_not_matter() {
    let a = ApiRequest::get("/users", json!({ "page": 1, "q": "al" }));
    let b = ApiRequest::get("/users", json!({ "q": "al", "page": 1 }));
    assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
}

#[test]
fn null_members_are_ignored() {
    let a = ApiRequest::get("/users", json!({ "page": 1, "filter": null }));
    let b = ApiRequest::get("/users", json!({ "page": 1 }));
    assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
}

#[test]
fn nested_objects_are_normalized() {
    assert_eq!(
        normalize_params(&json!({ "b": { "y": 2, "x": [1, { "k": "v", "a": null }] }, "a": true })),
        r#"{"a":true,"b":{"x":[1,{"k":"v"}],"y":2}}"#
    );
}

#[test]
fn different_method_path_or_params_differ() {
    let base = ApiRequest::get("/users", json!({ "page": 1 }));
    assert_ne!(Fingerprint::of(&base), Fingerprint::of(&ApiRequest::post("/users", json!({ "page": 1 }))));
    assert_ne!(Fingerprint::of(&base), Fingerprint::of(&ApiRequest::get("/boards", json!({ "page": 1 }))));
    assert_ne!(Fingerprint::of(&base), Fingerprint::of(&ApiRequest::get("/users", json!({ "page": 2 }))));
}

#[test]
fn unique_fingerprints_never_collide() {
    let request = ApiRequest::get("/users", json!({}));
    assert_ne!(Fingerprint::unique(&request, 1), Fingerprint::unique(&request, 2));
    assert_ne!(Fingerprint::unique(&request, 1), Fingerprint::of(&request));
    assert_eq!(Fingerprint::unique(&request, 1).endpoint(), "GET /users");
}
