//! Handlers for the outgoing mail resource.
//!
//! Every handler is scoped to the caller identity carried in [`Claims`].
//! Show, update and delete treat records owned by someone else as missing;
//! the toggles answer 403 for them instead.

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::{Map, Value};
use tracing::info;

use mailbook_db::models::OutgoingRow;
use mailbook_types::api::{
    Claims, OutgoingQuery, OutgoingResource, ToggleSentResponse, ToggleThankedResponse,
};
use mailbook_types::models::{ListFilter, OutgoingFlag};

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::resource::{to_resource, to_resources};
use crate::validation::validate;

/// Cookie carrying the one-shot success notice across the post-create redirect.
pub const FLASH_COOKIE: &str = "mailbook_flash";
pub const FLASH_CREATED: &str = "outgoing_created";

const RESOURCE: &str = "Outgoing";

/// GET /api/outgoing — caller's records as JSON, newest date first.
pub async fn index(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    query: Result<Query<OutgoingQuery>, QueryRejection>,
) -> Result<Json<Vec<OutgoingResource>>, ApiError> {
    let Query(query) = query?;
    let rows = list_for(&state, &claims, query.into()).await?;
    Ok(Json(to_resources(rows)))
}

pub(crate) async fn list_for(
    state: &AppState,
    claims: &Claims,
    filter: ListFilter,
) -> Result<Vec<OutgoingRow>, ApiError> {
    let user_id = claims.sub.to_string();
    blocking(state, move |db| db.find_outgoing_by_user(&user_id, &filter)).await
}

/// POST /outgoing — validate and create a record owned by the caller.
///
/// JSON clients get `201` and the record; page clients are redirected back
/// to the listing with a success flash.
pub async fn store(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    jar: CookieJar,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let raw = json_object(payload)?;
    let fields = validate(&raw).map_err(ApiError::Validation)?.into_fields(false, false);

    let user_id = claims.sub.to_string();
    let row = blocking(&state, move |db| db.insert_outgoing(&user_id, &fields)).await?;

    info!("Outgoing {} created by {}", row.id, claims.username);

    if wants_json(&headers) {
        return Ok((StatusCode::CREATED, Json(to_resource(row))).into_response());
    }

    let flash = Cookie::build((FLASH_COOKIE, FLASH_CREATED))
        .path("/")
        .http_only(true);
    Ok((jar.add(flash), Redirect::to("/outgoing")).into_response())
}

/// GET /outgoing/{id}
pub async fn show(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<OutgoingResource>, ApiError> {
    let row = blocking(&state, move |db| db.find_outgoing_by_id(id))
        .await?
        .filter(|row| row.user_id == claims.sub.to_string())
        .ok_or(ApiError::NotFound(RESOURCE))?;

    Ok(Json(to_resource(row)))
}

/// PUT/PATCH /outgoing/{id} — full replace through the create validator.
/// Flags that are not submitted keep their stored values.
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<OutgoingResource>, ApiError> {
    let raw = json_object(payload)?;
    let input = validate(&raw).map_err(ApiError::Validation)?;

    let user_id = claims.sub.to_string();
    let row = blocking(&state, move |db| {
        let Some(current) = db.find_outgoing_by_id(id)?.filter(|row| row.user_id == user_id) else {
            return Ok(None);
        };
        let fields = input.into_fields(current.thanked, current.has_been_sent);
        db.update_outgoing(id, &user_id, &fields)
    })
    .await?
    .ok_or(ApiError::NotFound(RESOURCE))?;

    info!("Outgoing {} updated by {}", id, claims.username);
    Ok(Json(to_resource(row)))
}

/// DELETE /outgoing/{id} — hard delete.
pub async fn destroy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let user_id = claims.sub.to_string();
    let deleted = blocking(&state, move |db| db.delete_outgoing(id, &user_id)).await?;

    if !deleted {
        return Err(ApiError::NotFound(RESOURCE));
    }

    info!("Outgoing {} deleted by {}", id, claims.username);
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /outgoing/{id}/thanked
pub async fn toggle_thanked(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<ToggleThankedResponse>, ApiError> {
    let thanked = toggle(&state, &claims, id, OutgoingFlag::Thanked).await?;
    Ok(Json(ToggleThankedResponse { id, thanked }))
}

/// PATCH /outgoing/{id}/has-been-sent
pub async fn toggle_sent(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<ToggleSentResponse>, ApiError> {
    let has_been_sent = toggle(&state, &claims, id, OutgoingFlag::HasBeenSent).await?;
    Ok(Json(ToggleSentResponse { id, has_been_sent }))
}

async fn toggle(
    state: &AppState,
    claims: &Claims,
    id: i64,
    flag: OutgoingFlag,
) -> Result<bool, ApiError> {
    let owner = blocking(state, move |db| db.find_outgoing_by_id(id))
        .await?
        .map(|row| row.user_id)
        .ok_or(ApiError::NotFound(RESOURCE))?;

    if owner != claims.sub.to_string() {
        return Err(ApiError::Forbidden("This action is unauthorized."));
    }

    let value = blocking(state, move |db| db.toggle_outgoing_flag(id, flag))
        .await?
        .ok_or(ApiError::NotFound(RESOURCE))?;

    info!("Outgoing {} {} -> {} by {}", id, flag.column(), value, claims.username);
    Ok(value)
}

fn json_object(payload: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, ApiError> {
    match payload {
        Ok(Json(Value::Object(map))) => Ok(map),
        Ok(Json(_)) => Err(ApiError::BadRequest("Expected a JSON object.".into())),
        Err(rejection) => Err(rejection.into()),
    }
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}
