//! Health and readiness endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Current status of the service
    pub status: String,
    /// Version of the service
    pub version: String,
}

impl HealthResponse {
    fn with_status(status: &str) -> Self {
        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Liveness check: the process is up and serving
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::with_status("healthy"))
}

/// Readiness check: the database answers a round trip
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 500, description = "Database unreachable")
    )
)]
pub async fn readiness_check(
    State(state): State<crate::AppState>,
) -> AppResult<Json<HealthResponse>> {
    state.services.stats.ping().await?;
    Ok(Json(HealthResponse::with_status("ready")))
}
