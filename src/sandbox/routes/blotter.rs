//! Blotter Routes
//!
//! - GET /api/blotter - All reports
//! - GET /api/blotter/pending - Reports awaiting review
//! - POST /api/blotter - Submit a report
//! - GET /api/blotter/:id - One report; `?admin=1` includes reporter details
//! - PATCH /api/blotter/:id - Partial update
//! - DELETE /api/blotter/:id - Delete a report

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::model::{IncidentPatch, IncidentReport, IncidentStatus, NewIncidentReport, Record};
use crate::sandbox::error::{SandboxError, SandboxResult};
use crate::sandbox::state::SandboxState;

#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    #[serde(default)]
    pub admin: Option<String>,
}

impl DetailQuery {
    fn is_admin(&self) -> bool {
        matches!(self.admin.as_deref(), Some("1") | Some("true"))
    }
}

fn not_found(id: &str) -> SandboxError {
    SandboxError::NotFound(format!("Blotter {} not found", id))
}

/// Hide reporter identity unless the reporter opted in
fn public_view(mut report: IncidentReport) -> IncidentReport {
    if !report.show_reporter {
        report.reporter_name = None;
        report.reporter_contact = None;
    }
    report
}

/// GET /api/blotter
pub async fn list_reports(
    State(state): State<SandboxState>,
) -> SandboxResult<Json<Vec<IncidentReport>>> {
    state.ensure_online()?;
    let reports = state.reports.read().await;
    Ok(Json(reports.iter().cloned().map(public_view).collect()))
}

/// GET /api/blotter/pending
pub async fn list_pending(
    State(state): State<SandboxState>,
) -> SandboxResult<Json<Vec<IncidentReport>>> {
    state.ensure_online()?;
    let reports = state.reports.read().await;
    Ok(Json(
        reports
            .iter()
            .filter(|r| r.status == IncidentStatus::Pending)
            .cloned()
            .map(public_view)
            .collect(),
    ))
}

/// GET /api/blotter/:id
pub async fn get_report(
    State(state): State<SandboxState>,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> SandboxResult<Json<IncidentReport>> {
    state.ensure_record_ok(&id).await?;
    let reports = state.reports.read().await;
    let report = reports
        .iter()
        .find(|r| r.id == id)
        .cloned()
        .ok_or_else(|| not_found(&id))?;

    Ok(Json(if query.is_admin() {
        report
    } else {
        public_view(report)
    }))
}

/// POST /api/blotter
///
/// New reports always start as pending, whatever the payload says.
pub async fn create_report(
    State(state): State<SandboxState>,
    Json(req): Json<NewIncidentReport>,
) -> SandboxResult<(StatusCode, Json<IncidentReport>)> {
    state.ensure_online()?;

    let title = req.title.as_deref().unwrap_or("").trim();
    if title.is_empty() {
        return Err(SandboxError::Validation("Title is required".to_string()));
    }

    let draft = NewIncidentReport {
        status: None,
        ..req
    };
    let id = uuid::Uuid::new_v4().simple().to_string();
    let report = IncidentReport::materialize(draft, id, Utc::now());

    state.reports.write().await.push(report.clone());
    tracing::info!(id = %report.id, "Created blotter report");

    Ok((StatusCode::CREATED, Json(report)))
}

/// PATCH /api/blotter/:id
pub async fn update_report(
    State(state): State<SandboxState>,
    Path(id): Path<String>,
    Json(patch): Json<IncidentPatch>,
) -> SandboxResult<Json<IncidentReport>> {
    state.ensure_record_ok(&id).await?;
    let mut reports = state.reports.write().await;
    let report = reports
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| not_found(&id))?;

    report.apply(&patch);
    tracing::info!(id = %id, status = %report.status, "Updated blotter report");
    Ok(Json(report.clone()))
}

/// DELETE /api/blotter/:id
pub async fn delete_report(
    State(state): State<SandboxState>,
    Path(id): Path<String>,
) -> SandboxResult<StatusCode> {
    state.ensure_record_ok(&id).await?;
    let mut reports = state.reports.write().await;
    let before = reports.len();
    reports.retain(|r| r.id != id);
    if reports.len() == before {
        return Err(not_found(&id));
    }

    tracing::info!(id = %id, "Deleted blotter report");
    Ok(StatusCode::NO_CONTENT)
}
