//! API handlers for Libra REST endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod stats;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor carrying the session claims of the calling account.
/// Rejects requests whose Authorization header is missing, is not a
/// bearer token, or carries a token that fails signature or expiry
/// verification.
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                AppError::Authentication("Authorization header is not a bearer token".to_string())
            })?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}
