//! Integration tests for the OIDC discovery endpoint.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tessera_api_oauth::well_known_router;
use tower::ServiceExt;

#[tokio::test]
async fn discovery_document_advertises_endpoints() {
    let app = well_known_router(common::test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/openid-configuration")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(doc["issuer"], "https://id.corp.example");
    assert_eq!(
        doc["authorization_endpoint"],
        "https://id.corp.example/oauth/authorize"
    );
    assert_eq!(doc["token_endpoint"], "https://id.corp.example/oauth/token");
    assert_eq!(
        doc["userinfo_endpoint"],
        "https://id.corp.example/oauth/userinfo"
    );
    assert_eq!(
        doc["revocation_endpoint"],
        "https://id.corp.example/oauth/revoke"
    );
    assert_eq!(doc["response_types_supported"], serde_json::json!(["code"]));
    assert_eq!(
        doc["grant_types_supported"],
        serde_json::json!(["authorization_code", "refresh_token"])
    );
}
