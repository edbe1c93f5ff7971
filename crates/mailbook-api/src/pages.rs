//! Page responses for the client-side view layer.
//!
//! Each page is a `{component, props, url}` object; the listing pages carry
//! the caller's records plus the active filters.

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::{Value, json};

use mailbook_types::api::{Claims, OutgoingQuery, Page};
use mailbook_types::models::ListFilter;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::outgoing::{FLASH_COOKIE, FLASH_CREATED, list_for};
use crate::resource::to_resources;

fn render(component: &str, url: &str, props: Value) -> Json<Page> {
    Json(Page {
        component: component.to_string(),
        props,
        url: url.to_string(),
    })
}

fn auth_props(claims: &Claims) -> Value {
    json!({ "user": { "id": claims.sub, "username": claims.username } })
}

/// GET / — public landing page.
pub async fn welcome() -> Json<Page> {
    render("Welcome", "/", json!({}))
}

pub async fn dashboard(Extension(claims): Extension<Claims>) -> Json<Page> {
    render("Dashboard", "/dashboard", json!({ "auth": auth_props(&claims) }))
}

/// GET /outgoing — records already sent, with the post-create flash if any.
pub async fn outgoing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    query: Result<Query<OutgoingQuery>, QueryRejection>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let success = jar
        .get(FLASH_COOKIE)
        .filter(|c| c.value() == FLASH_CREATED)
        .map(|_| "Outgoing mail added.");
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));

    let filters = filter_props(&query);
    let filter = ListFilter {
        sent: Some(true),
        ..ListFilter::from(query)
    };
    let rows = list_for(&state, &claims, filter).await?;

    let page = render(
        "Outgoing",
        "/outgoing",
        json!({
            "auth": auth_props(&claims),
            "success": success,
            "outgoing": to_resources(rows),
            "filters": filters,
        }),
    );
    Ok((jar, page))
}

/// GET /offers — records not sent yet.
pub async fn offers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    query: Result<Query<OutgoingQuery>, QueryRejection>,
) -> Result<Json<Page>, ApiError> {
    let Query(query) = query?;
    let filters = filter_props(&query);
    let filter = ListFilter {
        sent: Some(false),
        ..ListFilter::from(query)
    };
    let rows = list_for(&state, &claims, filter).await?;

    Ok(render(
        "Offers",
        "/offers",
        json!({
            "auth": auth_props(&claims),
            "offers": to_resources(rows),
            "filters": filters,
        }),
    ))
}

pub async fn received(Extension(claims): Extension<Claims>) -> Json<Page> {
    render("Received", "/received", json!({ "auth": auth_props(&claims) }))
}

pub async fn analytics(Extension(claims): Extension<Claims>) -> Json<Page> {
    render("Analytics", "/analytics", json!({ "auth": auth_props(&claims) }))
}

fn filter_props(query: &OutgoingQuery) -> Value {
    json!({
        "username": query.username,
        "country": query.country,
        "region": query.region,
    })
}
