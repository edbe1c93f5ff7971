pub mod auth;
pub mod error;
pub mod middleware;
pub mod outgoing;
pub mod pages;
pub mod resource;
pub mod routes;
pub mod validation;

use mailbook_db::Database;
use tracing::error;

use crate::auth::AppState;
use crate::error::ApiError;

/// Run a store call off the async runtime.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
        })?
        .map_err(ApiError::from)
}
