//! Integration tests for token-endpoint request validation.
//!
//! These cover the validation layer that runs before any storage access:
//! grant-type dispatch and client-credential extraction.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tessera_api_oauth::oauth_router;
use tower::ServiceExt;

async fn post_token(form: &str) -> (StatusCode, serde_json::Value) {
    let app = oauth_router(common::test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/token")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn unsupported_grant_type_is_rejected() {
    let (status, body) =
        post_token("grant_type=password&client_id=tsr_x&client_secret=s&username=u&password=p")
            .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unsupported_grant_type");
}

#[tokio::test]
async fn missing_client_id_is_invalid_request() {
    let (status, body) = post_token("grant_type=authorization_code&code=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn authorization_code_grant_requires_code() {
    let (status, body) =
        post_token("grant_type=authorization_code&client_id=tsr_x&client_secret=s").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
    assert!(body["error_description"]
        .as_str()
        .unwrap()
        .contains("code is required"));
}

#[tokio::test]
async fn refresh_grant_requires_refresh_token() {
    let (status, body) =
        post_token("grant_type=refresh_token&client_id=tsr_x&client_secret=s").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn malformed_basic_auth_is_invalid_client() {
    let app = oauth_router(common::test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/token")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(header::AUTHORIZATION, "Basic %%%not-base64%%%")
                .body(Body::from("grant_type=authorization_code&code=abc"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
