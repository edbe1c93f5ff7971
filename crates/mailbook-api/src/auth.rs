use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{Json, extract::{State, rejection::JsonRejection}, http::StatusCode, response::IntoResponse};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use jsonwebtoken::{EncodingKey, Header, encode};
use rand_core::OsRng;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use mailbook_db::Database;
use mailbook_types::api::{
    Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, VerifyRequest,
};

use crate::blocking;
use crate::error::ApiError;
use crate::validation::FieldErrors;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    // Validate input
    let mut errors = FieldErrors::new();
    let username_len = req.username.chars().count();
    if !(3..=32).contains(&username_len) {
        errors.insert("username".into(), vec!["The username must be between 3 and 32 characters.".into()]);
    }
    if req.password.chars().count() < 8 {
        errors.insert("password".into(), vec!["The password must be at least 8 characters.".into()]);
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    // Hash password with Argon2id
    let password_hash = hash_password(&req.password)?;

    let user_id = Uuid::new_v4();
    let verification_token = generate_token();
    let token_hash = hash_token(&verification_token);
    let username = req.username;

    // The insert itself refuses a taken username
    let created = blocking(&state, move |db| {
        db.create_user(&user_id.to_string(), &username, &password_hash, &token_hash)
    })
    .await?;

    if !created {
        return Err(ApiError::Conflict("The username has already been taken."));
    }

    info!("Registered user {}", user_id);
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            verification_token,
        }),
    ))
}

pub async fn verify(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload?;
    let token_hash = hash_token(&req.token);
    let verified = blocking(&state, move |db| db.verify_user(&token_hash)).await?;

    if !verified {
        return Err(ApiError::NotFound("Verification token"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;
    let username = req.username.clone();
    let user = blocking(&state, move |db| db.get_user_by_username(&username))
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| anyhow::anyhow!("stored password hash unreadable: {}", e))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| {
            warn!("Failed login for {}", req.username);
            ApiError::Unauthenticated
        })?;

    let user_id: Uuid = user.id.parse().map_err(anyhow::Error::from)?;
    let token = create_token(&state.jwt_secret, user_id, &user.username)?;

    Ok(Json(LoginResponse {
        user_id,
        username: user.username,
        token,
    }))
}

pub fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Argon2id PHC string with a fresh OS-random salt.
fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    B64.encode(bytes)
}

/// Verification tokens are stored as SHA-256 hex, never in the clear.
fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_hash_stably() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(hash_token(&a), hash_token(&a));
        assert_eq!(hash_token(&a).len(), 64);
    }

    #[test]
    fn password_hashes_are_salted_and_verify() {
        let a = hash_password("correct horse").unwrap();
        let b = hash_password("correct horse").unwrap();
        assert_ne!(a, b);

        let parsed = PasswordHash::new(&a).unwrap();
        assert!(Argon2::default().verify_password(b"correct horse", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong horse", &parsed).is_err());
    }

    #[test]
    fn issued_token_decodes_with_same_secret() {
        let user_id = Uuid::new_v4();
        let token = create_token("secret", user_id, "alice").unwrap();

        let data = jsonwebtoken::decode::<Claims>(
            &token,
            &jsonwebtoken::DecodingKey::from_secret(b"secret"),
            &jsonwebtoken::Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, user_id);
        assert_eq!(data.claims.username, "alice");
    }
}
