//! Document Routes
//!
//! - GET /api/documents - All requests
//! - POST /api/documents - Submit a request; issues the tracking number
//! - GET /api/documents/:id - One request
//! - PATCH /api/documents/:id - Partial update
//! - DELETE /api/documents/:id - Delete a request
//! - GET /api/documents/track/by-number/:number - Lookup by tracking number

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::model::{tracking, DocumentPatch, DocumentRequest, NewDocumentRequest, Record};
use crate::sandbox::error::{SandboxError, SandboxResult};
use crate::sandbox::state::SandboxState;

fn not_found(id: &str) -> SandboxError {
    SandboxError::NotFound(format!("Document request {} not found", id))
}

/// GET /api/documents
pub async fn list_documents(
    State(state): State<SandboxState>,
) -> SandboxResult<Json<Vec<DocumentRequest>>> {
    state.ensure_online()?;
    let documents = state.documents.read().await;
    Ok(Json(documents.clone()))
}

/// GET /api/documents/:id
pub async fn get_document(
    State(state): State<SandboxState>,
    Path(id): Path<String>,
) -> SandboxResult<Json<DocumentRequest>> {
    state.ensure_record_ok(&id).await?;
    let documents = state.documents.read().await;
    documents
        .iter()
        .find(|d| d.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// POST /api/documents
///
/// Assigns the id, a unique `ABIS-` tracking number, and a pickup code when
/// pickup was requested.
pub async fn create_document(
    State(state): State<SandboxState>,
    Json(req): Json<NewDocumentRequest>,
) -> SandboxResult<(StatusCode, Json<DocumentRequest>)> {
    state.ensure_online()?;
    req.validate().map_err(|e| SandboxError::Validation(e.user_message()))?;

    let now = Utc::now();
    let mut documents = state.documents.write().await;

    let mut tracking_number = tracking::server_tracking_number(now);
    while documents
        .iter()
        .any(|d| d.tracking_number == tracking_number)
    {
        tracking_number = tracking::server_tracking_number(now);
    }

    let code = req.pickup.then(tracking::pickup_code);
    let id = uuid::Uuid::new_v4().simple().to_string();
    let doc = DocumentRequest::from_draft(req, id, tracking_number, code, now);

    documents.push(doc.clone());
    tracing::info!(
        id = %doc.id,
        tracking_number = %doc.tracking_number,
        document_type = %doc.document_type,
        "Created document request"
    );

    Ok((StatusCode::CREATED, Json(doc)))
}

/// PATCH /api/documents/:id
pub async fn update_document(
    State(state): State<SandboxState>,
    Path(id): Path<String>,
    Json(patch): Json<DocumentPatch>,
) -> SandboxResult<Json<DocumentRequest>> {
    state.ensure_record_ok(&id).await?;
    let mut documents = state.documents.write().await;
    let doc = documents
        .iter_mut()
        .find(|d| d.id == id)
        .ok_or_else(|| not_found(&id))?;

    doc.apply(&patch);
    tracing::info!(id = %id, status = %doc.status, "Updated document request");
    Ok(Json(doc.clone()))
}

/// DELETE /api/documents/:id
pub async fn delete_document(
    State(state): State<SandboxState>,
    Path(id): Path<String>,
) -> SandboxResult<StatusCode> {
    state.ensure_record_ok(&id).await?;
    let mut documents = state.documents.write().await;
    let before = documents.len();
    documents.retain(|d| d.id != id);
    if documents.len() == before {
        return Err(not_found(&id));
    }

    tracing::info!(id = %id, "Deleted document request");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/documents/track/by-number/:number
///
/// Tracking numbers match case-insensitively.
pub async fn track_by_number(
    State(state): State<SandboxState>,
    Path(number): Path<String>,
) -> SandboxResult<Json<DocumentRequest>> {
    state.ensure_online()?;
    let documents = state.documents.read().await;
    documents
        .iter()
        .find(|d| d.has_tracking_number(&number))
        .cloned()
        .map(Json)
        .ok_or_else(|| {
            SandboxError::NotFound(format!("No request with tracking number {}", number))
        })
}
