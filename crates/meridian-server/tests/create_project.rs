//! End-to-end tests for `POST /`.
//!
//! Requests are driven through [`Server::dispatch`], which runs the whole
//! pipeline on a buffered request:
//!
//! 1. Body validation
//! 2. `Authorization` presence
//! 3. Identity verification
//! 4. Project creation and outcome mapping

use std::sync::Arc;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Request, StatusCode};
use meridian_core::{StaticUserDirectory, UserDirectory, UuidIdentityVerifier};
use meridian_server::{create_project_handler, Server, ServerConfig, REQUEST_ID_HEADER};
use proptest::prelude::*;
use serde_json::{json, Value};
use uuid::Uuid;

const CALLER: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

type Response = http::Response<Bytes>;

/// Builds a server whose directory answers every lookup the same way.
fn server(directory: impl UserDirectory + 'static) -> Server {
    Server::new(
        ServerConfig::default(),
        create_project_handler(Arc::new(directory), Arc::new(UuidIdentityVerifier)),
    )
}

fn known_users() -> Server {
    server(StaticUserDirectory::all())
}

/// Creates a `POST /` request with an optional `Authorization` header.
fn make_request(body: impl Into<Bytes>, authorization: Option<&str>) -> Request<Bytes> {
    let mut builder = Request::post("/").header(CONTENT_TYPE, "application/json");
    if let Some(value) = authorization {
        builder = builder.header("Authorization", value);
    }
    builder.body(body.into()).unwrap()
}

fn body_text(response: &Response) -> String {
    String::from_utf8(response.body().to_vec()).unwrap()
}

fn body_json(response: &Response) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_created() {
    let response = known_users().dispatch(make_request(r#"{"name":"Demo"}"#, Some(CALLER)));

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

    let body = body_json(&response);
    assert_eq!(body["userId"], CALLER);
    assert_eq!(body["name"], "Demo");
    assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
    assert_eq!(body.as_object().unwrap().len(), 3);
}

#[test]
fn test_empty_name_rejected() {
    let response = known_users().dispatch(make_request(r#"{"name":""}"#, Some(CALLER)));

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(&response);
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    assert_eq!(body["error"]["issues"][0]["path"], "$.name");
}

#[test]
fn test_missing_authorization() {
    let response = known_users().dispatch(make_request(r#"{"name":"Demo"}"#, None));

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(&response), "No header Authorization");
}

#[test]
fn test_user_not_found() {
    let response = server(StaticUserDirectory::none())
        .dispatch(make_request(r#"{"name":"Demo"}"#, Some(CALLER)));

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(&response), "Sry, no user found");
}

// ============================================================================
// Stage ordering and edge cases
// ============================================================================

#[test]
fn test_body_rejected_before_header_checked() {
    let response = known_users().dispatch(make_request(r#"{"title":"Demo"}"#, None));

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(&response).contains("missing required property 'name'"));
}

#[test]
fn test_valid_body_with_extra_fields_then_missing_header() {
    let response = known_users().dispatch(make_request(r#"{"name":"Demo","owner":"x"}"#, None));

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(&response), "No header Authorization");
}

#[test]
fn test_empty_body() {
    let response = known_users().dispatch(make_request(Bytes::new(), Some(CALLER)));

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(&response)["error"]["issues"][0]["path"], "$");
}

#[test]
fn test_malformed_json() {
    let response = known_users().dispatch(make_request(r#"{"name":"#, Some(CALLER)));

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(&response).contains("malformed JSON"));
}

#[test]
fn test_extra_fields_ignored() {
    let response = known_users().dispatch(make_request(
        r#"{"name":"Demo","owner":"someone else","tags":[1,2]}"#,
        Some(CALLER),
    ));

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(body_json(&response).get("owner").is_none());
}

#[test]
fn test_name_is_trimmed() {
    let response = known_users().dispatch(make_request(r#"{"name":"  Demo  "}"#, Some(CALLER)));

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(&response)["name"], "Demo");
}

#[test]
fn test_invalid_identity_is_400() {
    let response = known_users().dispatch(make_request(r#"{"name":"Demo"}"#, Some("bob")));

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(&response);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    assert_eq!(body["error"]["issues"][0]["path"], "authorization");
}

#[test]
fn test_repeated_authorization_is_400() {
    let request = Request::post("/")
        .header("Authorization", CALLER)
        .header("Authorization", CALLER)
        .body(Bytes::from_static(br#"{"name":"Demo"}"#))
        .unwrap();
    let response = known_users().dispatch(request);

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(&response)["error"]["code"], "INVALID_CREDENTIALS");
}

#[test]
fn test_header_name_is_case_insensitive() {
    let request = Request::post("/")
        .header("AUTHORIZATION", CALLER)
        .body(Bytes::from_static(br#"{"name":"Demo"}"#))
        .unwrap();

    assert_eq!(known_users().dispatch(request).status(), StatusCode::CREATED);
}

#[test]
fn test_uppercase_identity_is_echoed_verbatim() {
    let upper = CALLER.to_uppercase();
    let response = known_users().dispatch(make_request(r#"{"name":"Demo"}"#, Some(&upper)));

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(&response)["userId"], upper.as_str());
}

#[test]
fn test_non_canonical_identity_forms_rejected() {
    let simple = CALLER.replace('-', "");
    let forms = [
        format!("{{{CALLER}}}"),
        format!("urn:uuid:{CALLER}"),
        simple,
    ];

    for form in &forms {
        let request = make_request(r#"{"name":"Demo"}"#, Some(form.as_str()));
        let response = known_users().dispatch(request);

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{form}");
        assert_eq!(body_json(&response)["error"]["code"], "INVALID_CREDENTIALS");
    }
}

#[test]
fn test_directory_consulted_per_caller() {
    let other = "9b2c1d3e-0000-4000-8000-000000000001";
    let server = server(StaticUserDirectory::only([CALLER.parse().unwrap()]));

    let known = server.dispatch(make_request(r#"{"name":"Demo"}"#, Some(CALLER)));
    let unknown = server.dispatch(make_request(r#"{"name":"Demo"}"#, Some(other)));

    assert_eq!(known.status(), StatusCode::CREATED);
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_every_response_has_request_id() {
    let server = known_users();
    let responses = [
        server.dispatch(make_request(r#"{"name":"Demo"}"#, Some(CALLER))),
        server.dispatch(make_request(r#"{"name":""}"#, Some(CALLER))),
        server.dispatch(make_request(r#"{"name":"Demo"}"#, None)),
    ];

    for response in &responses {
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }
}

#[test]
fn test_other_methods_and_paths() {
    let server = known_users();

    let get = Request::get("/").body(Bytes::new()).unwrap();
    assert_eq!(server.dispatch(get).status(), StatusCode::METHOD_NOT_ALLOWED);

    let elsewhere = Request::post("/projects")
        .header("Authorization", CALLER)
        .body(Bytes::from_static(br#"{"name":"Demo"}"#))
        .unwrap();
    assert_eq!(server.dispatch(elsewhere).status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_oversized_body() {
    let server = Server::new(
        ServerConfig::builder().max_body_bytes(8).build(),
        create_project_handler(
            Arc::new(StaticUserDirectory::all()),
            Arc::new(UuidIdentityVerifier),
        ),
    );

    let response = server.dispatch(make_request(r#"{"name":"Demo"}"#, Some(CALLER)));
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(&response)["error"]["code"], "PAYLOAD_TOO_LARGE");
}

#[test]
fn test_raised_body_limit_admits_large_body() {
    let server = Server::new(
        ServerConfig::builder().max_body_bytes(4 * 1024 * 1024).build(),
        create_project_handler(
            Arc::new(StaticUserDirectory::all()),
            Arc::new(UuidIdentityVerifier),
        ),
    );

    let name = "x".repeat(1024 * 1024 + 16);
    let body = json!({ "name": name }).to_string();
    assert!(body.len() > 1024 * 1024);

    let response = server.dispatch(make_request(body, Some(CALLER)));
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(&response)["name"].as_str().map(str::len), Some(name.len()));
}

// ============================================================================
// Properties
// ============================================================================

fn invalid_name_body() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!({})),
        "[a-z]{1,8}".prop_map(|key| {
            let mut fields = serde_json::Map::new();
            fields.insert(format!("x{key}"), json!("Demo"));
            Value::Object(fields)
        }),
        "[ \t\n]{0,6}".prop_map(|name| json!({ "name": name })),
        any::<i64>().prop_map(|n| json!({ "name": n })),
        any::<bool>().prop_map(|b| json!({ "name": b })),
        Just(json!({ "name": null })),
        Just(json!({ "name": ["Demo"] })),
    ]
}

fn valid_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 _-]{0,30}[A-Za-z0-9]|[A-Za-z0-9]"
}

proptest! {
    #[test]
    fn prop_invalid_name_is_400(body in invalid_name_body(), with_header in any::<bool>()) {
        let header = with_header.then_some(CALLER);
        let response = known_users().dispatch(make_request(body.to_string(), header));

        prop_assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error = body_json(&response);
        prop_assert_eq!(&error["error"]["code"], "VALIDATION_FAILED");
        prop_assert!(error.to_string().contains("name"));
    }

    #[test]
    fn prop_missing_header_is_400(name in valid_name()) {
        let body = json!({ "name": name }).to_string();
        let response = known_users().dispatch(make_request(body, None));

        prop_assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        prop_assert_eq!(body_text(&response), "No header Authorization");
    }

    #[test]
    fn prop_created_echoes_caller_and_name(name in valid_name(), raw in any::<u128>()) {
        let caller = Uuid::from_u128(raw).to_string();
        let body = json!({ "name": name }).to_string();
        let response = known_users().dispatch(make_request(body, Some(&caller)));

        prop_assert_eq!(response.status(), StatusCode::CREATED);
        let project = body_json(&response);
        prop_assert_eq!(project["name"].as_str(), Some(name.as_str()));
        prop_assert_eq!(project["userId"].as_str(), Some(caller.as_str()));
        prop_assert!(Uuid::parse_str(project["id"].as_str().unwrap_or_default()).is_ok());
    }

    #[test]
    fn prop_unknown_user_is_404(name in valid_name(), raw in any::<u128>()) {
        let caller = Uuid::from_u128(raw).to_string();
        let body = json!({ "name": name }).to_string();
        let response = server(StaticUserDirectory::none()).dispatch(make_request(body, Some(&caller)));

        prop_assert_eq!(response.status(), StatusCode::NOT_FOUND);
        prop_assert_eq!(body_text(&response), "Sry, no user found");
    }
}
