use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::warn;

use mailbook_types::api::Claims;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

/// Require a valid bearer JWT for an existing, verified account.
///
/// On success the decoded [`Claims`] are placed in the request extensions so
/// handlers receive the caller identity explicitly.
pub async fn require_verified(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(ApiError::Unauthenticated)?;

    let token_data = decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        ApiError::Unauthenticated
    })?;
    let claims = token_data.claims;

    let user_id = claims.sub.to_string();
    let user = blocking(&state, move |db| db.get_user_by_id(&user_id))
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    if !user.is_verified() {
        return Err(ApiError::Forbidden("Your account has not been verified."));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
