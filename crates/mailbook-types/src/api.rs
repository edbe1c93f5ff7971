use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- JWT Claims --

/// JWT claims issued at login and checked by the auth gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    /// Handed to the account owner out of band; redeemed at `/auth/verify`.
    pub verification_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Outgoing --

/// Outgoing record as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingResource {
    pub id: i64,
    pub user_id: Uuid,
    pub username: String,
    pub name: Option<String>,
    pub date: NaiveDate,
    pub country: String,
    pub region: Option<String>,
    pub city: Option<String>,
    pub thanked: bool,
    pub has_been_sent: bool,
    pub occasion: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleThankedResponse {
    pub id: i64,
    pub thanked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleSentResponse {
    pub id: i64,
    pub has_been_sent: bool,
}

/// Query string accepted by the listing routes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingQuery {
    pub sent: Option<bool>,
    pub username: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
}

// -- Pages --

/// Page object handed to the client-side view layer.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page {
    pub component: String,
    pub props: serde_json::Value,
    pub url: String,
}
