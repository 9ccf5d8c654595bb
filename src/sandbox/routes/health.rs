//! Health Route
//!
//! - GET /health - Liveness and record counts

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::sandbox::state::SandboxState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub reports: usize,
    pub documents: usize,
    pub uptime_seconds: u64,
    pub version: String,
}

/// GET /health
///
/// Returns 503 while the sandbox is switched offline.
pub async fn health(State(state): State<SandboxState>) -> (StatusCode, Json<HealthResponse>) {
    let offline = state.is_offline();
    let reports = state.reports.read().await.len();
    let documents = state.documents.read().await.len();

    let status = if offline {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status,
        Json(HealthResponse {
            status: if offline { "offline" } else { "healthy" }.to_string(),
            reports,
            documents,
            uptime_seconds: state.uptime_seconds(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
