//! Loan ledger endpoints
//!
//! Students reserve and cancel; librarians decide, hand books over and
//! take them back. Listing routes come in two shapes: the librarian board
//! over the whole ledger and a student's own view.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{DueTodayEntry, LoanDetails, LoanRecord},
};

use super::AuthenticatedUser;

/// Reserve request
#[derive(Deserialize, ToSchema)]
pub struct ReserveRequest {
    /// Catalog id of the book to reserve
    pub book_id: i32,
}

/// Reserve a book for the current student
#[utoipa::path(
    post,
    path = "/loans/reserve",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = ReserveRequest,
    responses(
        (status = 201, description = "Reservation created", body = LoanRecord),
        (status = 403, description = "Student account required"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Book unavailable, duplicate reservation or quota reached")
    )
)]
pub async fn reserve(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<ReserveRequest>,
) -> AppResult<(StatusCode, Json<LoanRecord>)> {
    claims.require_student()?;

    let record = state
        .services
        .ledger
        .reserve(&claims.sub, request.book_id)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Get a single ledger record
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Ledger record", body = LoanRecord),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanRecord>> {
    let record = state.services.ledger.get(id, &claims).await?;
    Ok(Json(record))
}

/// Approve a pending reservation
#[utoipa::path(
    post,
    path = "/loans/{id}/accept",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Reservation accepted", body = LoanRecord),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Transaction not found"),
        (status = 422, description = "Record is not PENDING")
    )
)]
pub async fn accept(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanRecord>> {
    claims.require_admin()?;
    let record = state.services.ledger.accept(id).await?;
    Ok(Json(record))
}

/// Reject a pending reservation
#[utoipa::path(
    post,
    path = "/loans/{id}/decline",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Reservation declined", body = LoanRecord),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Transaction not found"),
        (status = 422, description = "Record is not PENDING")
    )
)]
pub async fn decline(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanRecord>> {
    claims.require_admin()?;
    let record = state.services.ledger.decline(id).await?;
    Ok(Json(record))
}

/// Withdraw a pending reservation. Owner-only: librarians refuse
/// requests through decline instead.
#[utoipa::path(
    post,
    path = "/loans/{id}/cancel",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = LoanRecord),
        (status = 403, description = "Not the owning student"),
        (status = 404, description = "Transaction not found"),
        (status = 422, description = "Record is not PENDING")
    )
)]
pub async fn cancel(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanRecord>> {
    let record = state.services.ledger.cancel(id, &claims).await?;
    Ok(Json(record))
}

/// Hand the book over to the student
#[utoipa::path(
    post,
    path = "/loans/{id}/borrow",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Loan started", body = LoanRecord),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Transaction not found"),
        (status = 422, description = "Record is not ACCEPTED")
    )
)]
pub async fn mark_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanRecord>> {
    claims.require_admin()?;
    let record = state.services.ledger.mark_borrowed(id).await?;
    Ok(Json(record))
}

/// Take the book back from the student
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Loan closed", body = LoanRecord),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Transaction not found"),
        (status = 422, description = "Record is not BORROWED")
    )
)]
pub async fn mark_returned(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanRecord>> {
    claims.require_admin()?;
    let record = state.services.ledger.mark_returned(id).await?;
    Ok(Json(record))
}

/// Librarian board of all active records
#[utoipa::path(
    get,
    path = "/loans/active",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active records, oldest requests first", body = Vec<LoanDetails>),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn list_active(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_admin()?;
    let records = state.services.ledger.list_active_board().await?;
    Ok(Json(records))
}

/// Completed transactions across the whole ledger
#[utoipa::path(
    get,
    path = "/loans/history",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Completed transactions, newest first", body = Vec<LoanDetails>),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn list_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_admin()?;
    let records = state.services.ledger.list_history(None).await?;
    Ok(Json(records))
}

/// The current student's active records
#[utoipa::path(
    get,
    path = "/loans/mine",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own active records, newest first", body = Vec<LoanDetails>),
        (status = 403, description = "Student account required")
    )
)]
pub async fn list_mine(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_student()?;
    let records = state.services.ledger.list_student_active(&claims.sub).await?;
    Ok(Json(records))
}

/// The current student's completed transactions
#[utoipa::path(
    get,
    path = "/loans/mine/history",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own completed transactions", body = Vec<LoanDetails>),
        (status = 403, description = "Student account required")
    )
)]
pub async fn list_mine_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_student()?;
    let records = state
        .services
        .ledger
        .list_history(Some(&claims.sub))
        .await?;
    Ok(Json(records))
}

/// Live loans due today
#[utoipa::path(
    get,
    path = "/loans/due-today",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Loans due on the current date", body = Vec<DueTodayEntry>),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn due_today(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<DueTodayEntry>>> {
    claims.require_admin()?;
    let entries = state.services.ledger.due_today().await?;
    Ok(Json(entries))
}
