use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use rand_core::OsRng;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use gigfind_core::Marketplace;
use gigfind_types::api::{ApiResponse, AuthResponse, LoginRequest, RegisterRequest};
use gigfind_types::models::Claims;

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::users::user_response;
use crate::with_market;

pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub market: Marketplace,
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    // Hashing is CPU-bound, so it runs on the blocking pool with the insert.
    let user = with_market(&state, move |market| {
        if market.find_user_by_email(&req.email)?.is_some() {
            return Err(ApiError::conflict("Email already registered"));
        }
        let password_hash = hash_password(&req.password)?;
        Ok(market.register_user(&req.email, &password_hash, req.name.trim())?)
    })
    .await?;

    let token = create_token(&state.jwt_secret, state.token_ttl, user.id, &user.email)
        .map_err(|e| ApiError::internal("Token encoding failed", e))?;
    info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AuthResponse {
            token,
            user: user_response(user),
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let user = with_market(&state, move |market| {
        let credentials = market
            .user_credentials_by_email(&req.email)?
            .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;
        verify_password(&req.password, &credentials.password_hash)?;
        Ok(credentials.user)
    })
    .await?;

    let token = create_token(&state.jwt_secret, state.token_ttl, user.id, &user.email)
        .map_err(|e| ApiError::internal("Token encoding failed", e))?;

    Ok(Json(ApiResponse::ok(AuthResponse {
        token,
        user: user_response(user),
    })))
}

/// Argon2id PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal("Password hashing failed", e))
}

fn verify_password(password: &str, stored: &str) -> ApiResult<()> {
    let parsed_hash =
        PasswordHash::new(stored).map_err(|e| ApiError::internal("Stored hash unreadable", e))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| {
            warn!("Failed login attempt");
            ApiError::unauthorized(INVALID_CREDENTIALS)
        })
}

pub fn create_token(secret: &str, ttl: Duration, user_id: Uuid, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (Utc::now() + ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
