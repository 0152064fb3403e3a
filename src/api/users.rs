//! User directory endpoints
//!
//! The two account variants live under separate routes. All directory
//! management is librarian-only; accounts change their own profile through
//! the auth routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::user::{AdminUser, CreateAdmin, CreateStudent, StudentUser, UpdateUser},
};

use super::AuthenticatedUser;

/// List administrator accounts
#[utoipa::path(
    get,
    path = "/admins",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Administrators", body = Vec<AdminUser>),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn list_admins(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<AdminUser>>> {
    claims.require_admin()?;
    let users = state.services.directory.list_admins().await?;
    Ok(Json(users))
}

/// Get an administrator by school id
#[utoipa::path(
    get,
    path = "/admins/{school_id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("school_id" = String, Path, description = "School ID")),
    responses(
        (status = 200, description = "Administrator", body = AdminUser),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_admin(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(school_id): Path<String>,
) -> AppResult<Json<AdminUser>> {
    claims.require_admin()?;
    let user = state.services.directory.get_admin(&school_id).await?;
    Ok(Json(user))
}

/// Register an administrator account
#[utoipa::path(
    post,
    path = "/admins",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateAdmin,
    responses(
        (status = 201, description = "Administrator created", body = AdminUser),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "School id already registered")
    )
)]
pub async fn create_admin(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(user): Json<CreateAdmin>,
) -> AppResult<(StatusCode, Json<AdminUser>)> {
    claims.require_admin()?;
    let user = state.services.directory.create_admin(user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update an administrator account
#[utoipa::path(
    put,
    path = "/admins/{school_id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("school_id" = String, Path, description = "School ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Updated administrator", body = AdminUser),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_admin(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(school_id): Path<String>,
    Json(update): Json<UpdateUser>,
) -> AppResult<Json<AdminUser>> {
    claims.require_admin()?;
    let user = state
        .services
        .directory
        .update_admin(&school_id, update)
        .await?;
    Ok(Json(user))
}

/// Remove an administrator account
#[utoipa::path(
    delete,
    path = "/admins/{school_id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("school_id" = String, Path, description = "School ID")),
    responses(
        (status = 204, description = "Administrator deleted"),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn delete_admin(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(school_id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.directory.delete_admin(&school_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List student accounts
#[utoipa::path(
    get,
    path = "/students",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Students", body = Vec<StudentUser>),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn list_students(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<StudentUser>>> {
    claims.require_admin()?;
    let users = state.services.directory.list_students().await?;
    Ok(Json(users))
}

/// Get a student by school id
#[utoipa::path(
    get,
    path = "/students/{school_id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("school_id" = String, Path, description = "School ID")),
    responses(
        (status = 200, description = "Student", body = StudentUser),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_student(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(school_id): Path<String>,
) -> AppResult<Json<StudentUser>> {
    claims.require_admin()?;
    let user = state.services.directory.get_student(&school_id).await?;
    Ok(Json(user))
}

/// Register a student account
#[utoipa::path(
    post,
    path = "/students",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateStudent,
    responses(
        (status = 201, description = "Student created", body = StudentUser),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "School id already registered")
    )
)]
pub async fn create_student(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(user): Json<CreateStudent>,
) -> AppResult<(StatusCode, Json<StudentUser>)> {
    claims.require_admin()?;
    let user = state.services.directory.create_student(user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a student account
#[utoipa::path(
    put,
    path = "/students/{school_id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("school_id" = String, Path, description = "School ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Updated student", body = StudentUser),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_student(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(school_id): Path<String>,
    Json(update): Json<UpdateUser>,
) -> AppResult<Json<StudentUser>> {
    claims.require_admin()?;
    let user = state
        .services
        .directory
        .update_student(&school_id, update)
        .await?;
    Ok(Json(user))
}

/// Remove a student account
#[utoipa::path(
    delete,
    path = "/students/{school_id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("school_id" = String, Path, description = "School ID")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn delete_student(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(school_id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.directory.delete_student(&school_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
