//! Bearer token authentication and password hashing.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use model::entities::user;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AuthSettings;
use crate::error::ApiError;
use crate::schemas::AppState;

/// JWT payload.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// User email
    pub sub: String,
    pub user_id: i32,
    pub username: String,
    pub is_extension_agent: bool,
    pub exp: usize,
}

/// Signs a token for `user` valid for the configured lifetime.
pub fn issue_token(user: &user::Model, settings: &AuthSettings) -> Result<String, ApiError> {
    let expires_at = Utc::now() + Duration::hours(settings.token_ttl_hours);
    let claims = Claims {
        sub: user.email.clone(),
        user_id: user.id,
        username: user.username.clone(),
        is_extension_agent: user.is_extension_agent,
        exp: expires_at.timestamp().max(0) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(format!("signing token: {e}")))
}

pub fn decode_token(token: &str, settings: &AuthSettings) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        ApiError::unauthorized("Invalid or expired token")
    })
}

/// Claims of the authenticated caller, taken from `Authorization: Bearer`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        decode_token(token, &state.settings.auth).map(AuthUser)
    }
}

/// Hashes a password on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::internal(format!("hashing task failed: {e}")))?
        .map_err(ApiError::from)
}

/// Checks a password against a stored hash on the blocking pool.
pub async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::internal(format!("verification task failed: {e}")))?
        .map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> user::Model {
        user::Model {
            id: 7,
            username: "agent_smith".to_string(),
            email: "agent@example.com".to_string(),
            password_hash: String::new(),
            phone_number: None,
            county: Some("Nairobi".to_string()),
            farm_name: None,
            farm_size: None,
            is_extension_agent: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips_claims() {
        let settings = AuthSettings::default();
        let token = issue_token(&sample_user(), &settings).unwrap();
        let claims = decode_token(&token, &settings).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.sub, "agent@example.com");
        assert!(claims.is_extension_agent);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token(&sample_user(), &AuthSettings::default()).unwrap();
        let other = AuthSettings {
            jwt_secret: "another-secret".to_string(),
            ..AuthSettings::default()
        };
        let err = decode_token(&token, &other).unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[test]
    fn expired_token_is_rejected() {
        let settings = AuthSettings {
            token_ttl_hours: -2,
            ..AuthSettings::default()
        };
        let token = issue_token(&sample_user(), &settings).unwrap();
        assert!(decode_token(&token, &settings).is_err());
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hash = hash_password("password123".to_string(), 4).await.unwrap();
        assert!(verify_password("password123".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("wrong".to_string(), hash).await.unwrap());
    }
}
