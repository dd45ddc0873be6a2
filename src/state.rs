use sqlx::SqlitePool;
use std::sync::Arc;

use crate::session::SessionGuard;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub guard: Arc<SessionGuard>,
}

#[cfg(test)]
impl AppState {
    /// In-memory store and a guard for `captain` / `s3cret`.
    pub async fn for_tests() -> Self {
        use crate::session::AdminCredentials;
        Self {
            db: crate::db::memory_pool().await,
            guard: Arc::new(SessionGuard::new(AdminCredentials::new("captain", "s3cret"))),
        }
    }
}
