//! Dashboard statistics endpoint

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, models::loan::DueTodayEntry};

use super::AuthenticatedUser;

/// Library snapshot for the librarian dashboard
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_books: i64,
    pub available_books: i64,
    pub borrowed_books: i64,
    /// Books returned but not yet reshelved
    pub pending_shelving: i64,
    pub total_students: i64,
    /// Ledger records in PENDING, ACCEPTED or BORROWED
    pub active_records: i64,
    pub due_today: Vec<DueTodayEntry>,
}

/// Get dashboard statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Library statistics", body = DashboardStats),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DashboardStats>> {
    claims.require_admin()?;
    let stats = state.services.stats.dashboard().await?;
    Ok(Json(stats))
}
