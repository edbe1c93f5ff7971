use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::{self, AppState};
use crate::middleware::require_verified;
use crate::{outgoing, pages};

/// Every route the service answers. Everything except the landing page,
/// the health check and the auth endpoints needs a verified caller.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(pages::welcome))
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/verify", post(auth::verify))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/outgoing", get(pages::outgoing).post(outgoing::store))
        .route(
            "/outgoing/{id}",
            get(outgoing::show)
                .put(outgoing::update)
                .patch(outgoing::update)
                .delete(outgoing::destroy),
        )
        .route("/outgoing/{id}/thanked", patch(outgoing::toggle_thanked))
        .route("/outgoing/{id}/has-been-sent", patch(outgoing::toggle_sent))
        .route("/api/outgoing", get(outgoing::index))
        .route("/offers", get(pages::offers))
        .route("/received", get(pages::received))
        .route("/analytics", get(pages::analytics))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_verified));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// GET /health — liveness check (no auth).
async fn health() -> &'static str {
    "ok"
}
