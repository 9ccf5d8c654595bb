//! Document requests

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::tracking;
use super::{lenient_timestamp, optional_id, text_fields, DocumentType, FieldKind, Record};
use crate::error::{RecordsError, RecordsResult};

/// Processing status of a document request
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Processing,
    Approved,
    ReadyForPickup,
    Issued,
    Collected,
    Rejected,
}

/// Order used to place a status on the progress timeline
const TIMELINE_ORDER: [DocumentStatus; 6] = [
    DocumentStatus::Pending,
    DocumentStatus::Processing,
    DocumentStatus::Approved,
    DocumentStatus::ReadyForPickup,
    DocumentStatus::Issued,
    DocumentStatus::Collected,
];

impl DocumentStatus {
    /// Get all statuses for iteration
    pub fn all() -> &'static [DocumentStatus] {
        &[
            DocumentStatus::Pending,
            DocumentStatus::Processing,
            DocumentStatus::Approved,
            DocumentStatus::ReadyForPickup,
            DocumentStatus::Issued,
            DocumentStatus::Collected,
            DocumentStatus::Rejected,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Approved => "approved",
            DocumentStatus::ReadyForPickup => "ready_for_pickup",
            DocumentStatus::Issued => "issued",
            DocumentStatus::Collected => "collected",
            DocumentStatus::Rejected => "rejected",
        }
    }

    /// Human label ("ready for pickup")
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Position on the progress timeline; `None` for statuses off the happy path
    pub fn timeline_index(&self) -> Option<usize> {
        TIMELINE_ORDER.iter().position(|s| s == self)
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase().replace([' ', '-'], "_");
        DocumentStatus::all()
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown document status: {}", s))
    }
}

/// A resident's request for a certificate or permit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "WireDocument")]
pub struct DocumentRequest {
    pub id: String,
    pub tracking_number: String,
    pub resident_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resident_contact: Option<String>,
    pub document_type: DocumentType,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub form_fields: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_date: Option<DateTime<Utc>>,
    /// Requested pickup slot, `YYYY-MM-DDTHH:MM`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_datetime: Option<String>,
    pub pickup: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_code: Option<String>,
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Incoming request shape; `_id` wins over `id` when both are present
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDocument {
    #[serde(rename = "_id", default, deserialize_with = "optional_id")]
    backend_id: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    id: Option<String>,
    #[serde(default)]
    tracking_number: String,
    #[serde(default)]
    resident_name: String,
    #[serde(default)]
    resident_contact: Option<String>,
    #[serde(default)]
    document_type: DocumentType,
    #[serde(default, deserialize_with = "text_fields")]
    form_fields: BTreeMap<String, String>,
    #[serde(default)]
    purpose: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    request_date: Option<DateTime<Utc>>,
    #[serde(default)]
    appointment_datetime: Option<String>,
    #[serde(default)]
    pickup: bool,
    #[serde(default)]
    pickup_code: Option<String>,
    #[serde(default)]
    status: DocumentStatus,
    #[serde(default)]
    remarks: Option<String>,
}

impl From<WireDocument> for DocumentRequest {
    fn from(wire: WireDocument) -> Self {
        Self {
            id: wire.backend_id.or(wire.id).unwrap_or_default(),
            tracking_number: wire.tracking_number,
            resident_name: wire.resident_name,
            resident_contact: wire.resident_contact,
            document_type: wire.document_type,
            form_fields: wire.form_fields,
            purpose: wire.purpose,
            request_date: wire.request_date,
            appointment_datetime: wire.appointment_datetime,
            pickup: wire.pickup,
            pickup_code: wire.pickup_code,
            status: wire.status,
            remarks: wire.remarks,
        }
    }
}

impl DocumentRequest {
    /// Build a request from a draft with identifiers chosen by the caller.
    ///
    /// The pickup code is kept only when pickup was requested.
    pub fn from_draft(
        draft: NewDocumentRequest,
        id: String,
        tracking_number: String,
        pickup_code: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let pickup_code = if draft.pickup { pickup_code } else { None };
        Self {
            id,
            tracking_number,
            resident_name: draft.resident_name,
            resident_contact: draft.resident_contact,
            document_type: draft.document_type,
            form_fields: draft.form_fields,
            purpose: draft.purpose,
            request_date: Some(now),
            appointment_datetime: draft.appointment_datetime,
            pickup: draft.pickup,
            pickup_code,
            status: DocumentStatus::Pending,
            remarks: None,
        }
    }

    /// Case-insensitive match on tracking number or resident name
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.tracking_number.to_lowercase().contains(&term)
            || self.resident_name.to_lowercase().contains(&term)
    }

    /// Tracking numbers compare case-insensitively
    pub fn has_tracking_number(&self, number: &str) -> bool {
        self.tracking_number.eq_ignore_ascii_case(number.trim())
    }

    /// Whether this request was created offline and never reached the backend
    pub fn is_local(&self) -> bool {
        tracking::is_local_tracking_number(&self.tracking_number)
    }
}

/// Form payload for a new document request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDocumentRequest {
    pub resident_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resident_contact: Option<String>,
    pub document_type: DocumentType,
    #[serde(default, deserialize_with = "text_fields")]
    pub form_fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default)]
    pub appointment_datetime: Option<String>,
    #[serde(default)]
    pub pickup: bool,
}

/// Format of the appointment input, as a browser `datetime-local` sends it
const APPOINTMENT_FORMAT: &str = "%Y-%m-%dT%H:%M";

impl NewDocumentRequest {
    /// Check the draft before it is sent anywhere.
    ///
    /// Requires a resident name and every required field of the document
    /// type. Number fields must parse; the appointment, when given, must be
    /// `YYYY-MM-DDTHH:MM`.
    pub fn validate(&self) -> RecordsResult<()> {
        if self.resident_name.trim().is_empty() {
            return Err(RecordsError::Validation(
                "Resident name is required".to_string(),
            ));
        }

        for field in self.document_type.extra_fields() {
            let value = self
                .form_fields
                .get(field.name)
                .map(|v| v.trim())
                .unwrap_or("");

            if value.is_empty() {
                if field.required {
                    return Err(RecordsError::Validation(format!(
                        "{} is required for {}",
                        field.label, self.document_type
                    )));
                }
                continue;
            }

            if field.kind == FieldKind::Number && value.parse::<f64>().is_err() {
                return Err(RecordsError::Validation(format!(
                    "{} must be a number",
                    field.label
                )));
            }
        }

        if let Some(slot) = self.appointment_datetime.as_deref() {
            let unreadable = NaiveDateTime::parse_from_str(slot, APPOINTMENT_FORMAT).is_err();
            if !slot.is_empty() && unreadable {
                return Err(RecordsError::Validation(format!(
                    "Invalid appointment date and time: {}",
                    slot
                )));
            }
        }

        Ok(())
    }
}

/// Partial update for a document request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resident_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl DocumentPatch {
    /// Status-only patch
    pub fn status(status: DocumentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

impl Record for DocumentRequest {
    type Draft = NewDocumentRequest;
    type Patch = DocumentPatch;

    const RESOURCE: &'static str = "documents";
    const STORAGE_KEY: &'static str = "documents";

    fn id(&self) -> &str {
        &self.id
    }

    fn materialize(draft: NewDocumentRequest, id: String, now: DateTime<Utc>) -> Self {
        let code = draft.pickup.then(tracking::pickup_code);
        Self::from_draft(draft, id, tracking::local_tracking_number(now), code, now)
    }

    fn apply(&mut self, patch: &DocumentPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(name) = &patch.resident_name {
            self.resident_name = name.clone();
        }
        if let Some(kind) = patch.document_type {
            self.document_type = kind;
        }
        if let Some(remarks) = &patch.remarks {
            self.remarks = Some(remarks.clone());
        }
    }
}
