use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::warn;
use uuid::Uuid;

use gigfind_core::DomainError;
use gigfind_types::models::Claims;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::with_market;

/// The authenticated caller. Taking this as a handler argument makes the
/// route require a valid bearer token for a user that still exists.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Validate signature and expiry.
pub fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> ApiResult<Self> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::unauthorized("Missing or invalid authorization header"))?;

        let claims = decode_token(&state.jwt_secret, bearer.token())
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

        let id = claims.sub;
        let user = with_market(state, move |market| match market.user(id) {
            Ok(user) => Ok(Some(user)),
            Err(DomainError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        })
        .await?;

        match user {
            Some(user) => Ok(AuthUser {
                id: user.id,
                email: user.email,
            }),
            None => {
                warn!("Token for deleted user {}", id);
                Err(ApiError::unauthorized("User not found"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::auth::create_token;

    #[test]
    fn test_decode_roundtrip() {
        let id = Uuid::new_v4();
        let token = create_token("s3cret", Duration::days(7), id, "a@example.com").unwrap();

        let claims = decode_token("s3cret", &token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.email, "a@example.com");

        assert!(decode_token("other-secret", &token).is_none());
        assert!(decode_token("s3cret", "not.a.jwt").is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = create_token("s3cret", Duration::days(-1), Uuid::new_v4(), "a@example.com").unwrap();
        assert!(decode_token("s3cret", &token).is_none());
    }
}
