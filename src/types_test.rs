use super::*;
use serde_json::json;

#[test]
fn user_accepts_canonical_fields() {
    let user: User = serde_json::from_value(json!({
        "id": "u1", "name": "Alice", "email": "alice@example.com"
    }))
    .unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(user.name, "Alice");
    assert!(!user.onboarding);
}

#[test]
fn user_accepts_backend_dto_spelling_and_numeric_id() {
    let user: User = serde_json::from_value(json!({
        "userId": 42, "userName": "Bob", "email": "bob@example.com", "onboarding": true
    }))
    .unwrap();
    assert_eq!(user.id, "42");
    assert_eq!(user.name, "Bob");
    assert!(user.onboarding);
}

#[test]
fn user_rejects_non_scalar_id() {
    let result: Result<User, _> =
        serde_json::from_value(json!({ "id": [1], "name": "X", "email": "x@example.com" }));
    assert!(result.is_err());
}

#[test]
fn login_response_reads_user_dto_alias() {
    let resp: LoginResponse = serde_json::from_value(json!({
        "accessToken": "a1",
        "refreshToken": "r1",
        "userDto": { "userId": "u1", "userName": "Alice", "email": "a@example.com", "onboarding": false }
    }))
    .unwrap();
    assert_eq!(resp.access_token.as_deref(), Some("a1"));
    assert_eq!(resp.refresh_token.as_deref(), Some("r1"));
    assert_eq!(resp.user.map(|u| u.name).as_deref(), Some("Alice"));
}

#[test]
fn login_response_tolerates_missing_fields() {
    let resp: LoginResponse = serde_json::from_value(json!({})).unwrap();
    assert!(resp.access_token.is_none());
    assert!(resp.user.is_none());
}

#[test]
fn profile_response_accepts_bare_and_wrapped() {
    let bare: ProfileResponse =
        serde_json::from_value(json!({ "id": "u1", "name": "A", "email": "a@example.com" })).unwrap();
    assert_eq!(bare.into_user().id, "u1");

    let wrapped: ProfileResponse =
        serde_json::from_value(json!({ "user": { "id": "u2", "name": "B", "email": "b@example.com" } })).unwrap();
    assert_eq!(wrapped.into_user().id, "u2");
}

#[test]
fn refresh_response_accepts_bare_string() {
    let resp: RefreshResponse = serde_json::from_str(r#""new-access""#).unwrap();
    assert_eq!(resp.into_tokens(), ("new-access".to_owned(), None));
}

#[test]
fn refresh_response_accepts_object_with_rotation() {
    let resp: RefreshResponse =
        serde_json::from_value(json!({ "accessToken": "a2", "refreshToken": "r2" })).unwrap();
    assert_eq!(resp.into_tokens(), ("a2".to_owned(), Some("r2".to_owned())));
}

#[test]
fn signup_request_uses_backend_field_names() {
    let body = serde_json::to_value(SignupRequest { full_name: "Ann", email: "a@example.com", password: "secret1" })
        .unwrap();
    assert_eq!(body, json!({ "fullName": "Ann", "email": "a@example.com", "password": "secret1" }));
}

#[test]
fn envelope_recognizes_backend_wrapper() {
    let envelope = Envelope::parse(r#"{"status":201,"message":"New access token","data":"a2"}"#).unwrap();
    assert!(envelope.is_success());
    assert_eq!(envelope.into_data(), json!("a2"));

    let rejected = Envelope::parse(r#"{"status":400,"message":"Registration failed"}"#).unwrap();
    assert!(!rejected.is_success());
    assert_eq!(rejected.into_data(), serde_json::Value::Null);
}

#[test]
fn envelope_ignores_unwrapped_bodies() {
    assert!(Envelope::parse(r#""a2""#).is_none());
    assert!(Envelope::parse(r#"{"accessToken":"a1","refreshToken":"r1"}"#).is_none());
    assert!(Envelope::parse(r#"{"id":"u1","name":"A","email":"a@example.com"}"#).is_none());
    assert!(Envelope::parse("").is_none());
}

#[test]
fn login_response_decodes_from_envelope_data() {
    let envelope = Envelope::parse(
        r#"{"status":201,"message":"ok","data":{"accessToken":"a1","refreshToken":"r1",
            "userDto":{"userId":3,"userName":"Cy","email":"c@example.com"}}}"#,
    )
    .unwrap();
    let resp: LoginResponse = serde_json::from_value(envelope.into_data()).unwrap();
    assert_eq!(resp.access_token.as_deref(), Some("a1"));
    assert_eq!(resp.user.map(|u| u.id).as_deref(), Some("3"));
}
