//! System endpoints: health check and snapshot admin.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` when the server answers.
    pub status: String,
    /// Current server time.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
}

/// Snapshot trigger response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SnapshotResponse {
    /// `false` when persistence is disabled.
    pub saved: bool,
    /// Users written.
    pub users: usize,
    /// Meetings written.
    pub meetings: usize,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `POST /admin/snapshot` — Write a snapshot now.
///
/// # Errors
///
/// Returns [`GatewayError::Persistence`] if the snapshot cannot be written.
#[utoipa::path(
    post,
    path = "/admin/snapshot",
    tag = "System",
    summary = "Write a snapshot",
    description = "Dumps all users and meetings to the data directory immediately.",
    responses(
        (status = 200, description = "Snapshot result", body = SnapshotResponse),
        (status = 500, description = "Snapshot failed", body = ErrorResponse),
    )
)]
pub async fn snapshot_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    let response = match state.scheduling_service.save_snapshot().await? {
        Some((users, meetings)) => SnapshotResponse {
            saved: true,
            users,
            meetings,
        },
        None => SnapshotResponse {
            saved: false,
            users: 0,
            meetings: 0,
        },
    };
    Ok(Json(response))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/admin/snapshot", post(snapshot_handler))
}
