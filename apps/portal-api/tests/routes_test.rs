//! Smoke tests for the composed public routing surface.
//!
//! Uses a lazy (never-connected) pool: every route under test resolves
//! without touching the database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tessera_api_oauth::{well_known_router, OAuthState};
use tessera_api_sso::{auth_router, FederationConfig, SessionConfig, SsoState};
use tower::ServiceExt;

const TEST_KEY: &[u8] = b"-----BEGIN PUBLIC KEY-----\nplaceholder\n-----END PUBLIC KEY-----";

fn session_config() -> SessionConfig {
    SessionConfig {
        private_key: TEST_KEY.to_vec(),
        public_key: TEST_KEY.to_vec(),
        issuer: "https://id.corp.example".to_string(),
        ttl_secs: 43_200,
        trust_forwarded_proto: true,
        development_mode: true,
    }
}

fn test_app() -> axum::Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://invalid-host/test")
        .expect("lazy pool");

    let sso_state = SsoState::new(
        pool.clone(),
        FederationConfig {
            issuer_url: "https://login.corp.example".to_string(),
            client_id: "portal".to_string(),
            client_secret: "secret".to_string(),
            callback_url: "https://id.corp.example/auth/sso/callback".to_string(),
            scopes: "openid profile email".to_string(),
        },
        session_config(),
    );

    let oauth_state = OAuthState::new(
        pool,
        "https://id.corp.example".to_string(),
        Arc::new(session_config()),
    );

    axum::Router::new()
        .nest("/auth", auth_router(sso_state))
        .nest("/.well-known", well_known_router(oauth_state))
}

#[tokio::test]
async fn auth_check_reports_unauthenticated_without_cookie() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/auth/check")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["authenticated"], false);
}

#[tokio::test]
async fn auth_me_requires_session() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn discovery_served_at_well_known() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/.well-known/openid-configuration")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
