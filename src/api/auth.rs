//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{UpdateUser, User},
};

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response with session token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    /// The authenticated account
    pub user: User,
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .auth
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse { token, user }))
}

/// Get the account behind the current session
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.auth.current_user(&claims).await?;
    Ok(Json(user))
}

/// Update the current account's own profile
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Updated account", body = User),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_profile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(update): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    let user = if claims.is_admin() {
        User::Admin(
            state
                .services
                .directory
                .update_admin(&claims.sub, update)
                .await?,
        )
    } else {
        User::Student(
            state
                .services
                .directory
                .update_student(&claims.sub, update)
                .await?,
        )
    };

    Ok(Json(user))
}
