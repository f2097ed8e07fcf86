//! tessera identity provider server.
//!
//! Federates corporate single sign-on against the external OpenID Connect
//! provider and acts as the OAuth2 authorization server for the internal
//! application fleet.

mod config;
mod health;
mod logging;
mod state;

use axum::{routing::get, Router};
use config::Config;
use health::{health_handler, livez_handler, readyz_handler};
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tessera_api_oauth::{api_router, oauth_router, well_known_router, OAuthState};
use tessera_api_sso::{auth_router, FederationConfig, SessionConfig, SsoState};
use tokio::signal;
use tower_http::cors::CorsLayer;
use tracing::info;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        env = %config.app_env,
        "Starting tessera portal-api"
    );

    // Create database connection pool
    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            info!("Database connection established");
            pool
        }
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    // Apply pending migrations before serving traffic
    if let Err(e) = tessera_db::run_migrations(&pool).await {
        eprintln!("Failed to run database migrations: {e}");
        std::process::exit(1);
    }

    // Session configuration shared by the SSO and OAuth crates
    let session_config = Arc::new(SessionConfig {
        private_key: config.session_private_key.as_bytes().to_vec(),
        public_key: config.session_public_key.as_bytes().to_vec(),
        issuer: config.issuer_url.clone(),
        ttl_secs: config.session_ttl_secs,
        trust_forwarded_proto: config.trust_forwarded_proto,
        development_mode: !config.app_env.is_production(),
    });

    // SSO/session routes
    let sso_state = SsoState {
        pool: pool.clone(),
        federation: Arc::new(tessera_api_sso::FederationService::new(
            pool.clone(),
            FederationConfig {
                issuer_url: config.sso_issuer_url.clone(),
                client_id: config.sso_client_id.clone(),
                client_secret: config.sso_client_secret.clone(),
                callback_url: format!(
                    "{}/auth/sso/callback",
                    config.issuer_url.trim_end_matches('/')
                ),
                scopes: config.sso_scopes.clone(),
            },
        )),
        session: session_config.clone(),
    };
    let auth_routes = auth_router(sso_state);

    // OAuth2 provider routes
    let oauth_state = OAuthState::with_refresh_ttl_days(
        pool.clone(),
        config.issuer_url.clone(),
        session_config,
        config.refresh_token_ttl_days,
    );
    let oauth_routes = oauth_router(oauth_state.clone());
    let well_known_routes = well_known_router(oauth_state.clone());
    let api_routes = api_router(oauth_state.clone());

    let app_state = AppState::new(pool.clone());
    let shutting_down = app_state.shutting_down.clone();

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/livez", get(livez_handler))
        .route("/readyz", get(readyz_handler))
        .with_state(app_state)
        .nest("/auth", auth_routes)
        .nest("/oauth", oauth_routes)
        .nest("/.well-known", well_known_routes)
        .nest("/api", api_routes)
        .layer(build_cors_layer(&config.cors_origins));

    // Background garbage collection for expired codes, tokens and login
    // sessions. Per-row conditional updates make concurrent instances
    // safe; the purge loop only bounds table growth.
    spawn_purge_task(oauth_state, pool.clone());

    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutting_down))
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Spawn the periodic purge of expired authorization codes, lapsed token
/// pairs, and stale SSO login sessions.
fn spawn_purge_task(oauth_state: OAuthState, pool: tessera_db::DbPool) {
    tokio::spawn(async move {
        let interval = Duration::from_secs(15 * 60);
        loop {
            tokio::time::sleep(interval).await;

            match oauth_state.tokens.purge_expired().await {
                Ok((codes, tokens)) if codes > 0 || tokens > 0 => {
                    info!(codes, tokens, "Purged expired codes and tokens");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to purge expired codes/tokens");
                }
            }

            match tessera_db::models::SsoLoginSession::cleanup_expired(&pool).await {
                Ok(count) if count > 0 => {
                    info!(deleted = count, "Purged expired SSO login sessions");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to purge SSO login sessions");
                }
            }
        }
    });
}

/// Build the CORS layer from configured origins. With no configured
/// origins the layer is permissive only for same-origin requests (no CORS
/// headers emitted).
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new();
    }

    let allowed: Vec<axum::http::HeaderValue> =
        origins.iter().filter_map(|o| o.parse().ok()).collect();

    use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE};
    use axum::http::Method;

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT, COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Graceful shutdown signal handler.
///
/// Sets the `shutting_down` flag before returning so the readiness probe
/// reports 503 and traffic drains before connections close.
async fn shutdown_signal(shutting_down: Arc<std::sync::atomic::AtomicBool>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    shutting_down.store(true, std::sync::atomic::Ordering::Release);
    info!("Readiness probe set to unhealthy - draining traffic");
}
