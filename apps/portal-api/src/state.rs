//! Application state for the server binary.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tessera_db::DbPool;

/// State shared by the health/readiness handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Set when graceful shutdown begins; readiness flips to 503 so the
    /// load balancer drains traffic before connections close.
    pub shutting_down: Arc<AtomicBool>,
}

impl AppState {
    /// Create the app state.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }
}
