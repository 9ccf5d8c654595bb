//! Incident (blotter) reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{lenient_timestamp, optional_id, Attachment, Record};

/// Review status of an incident report
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    /// Submitted, not yet reviewed
    #[default]
    Pending,
    /// Visible in public views
    Published,
    /// Refused by staff
    Rejected,
    /// Under active investigation (the local log calls this "ongoing")
    #[serde(alias = "ongoing")]
    Investigating,
    Closed,
    Archived,
    UnderReview,
    Resolved,
}

impl IncidentStatus {
    /// Get all statuses for iteration
    pub fn all() -> &'static [IncidentStatus] {
        &[
            IncidentStatus::Pending,
            IncidentStatus::Published,
            IncidentStatus::Rejected,
            IncidentStatus::Investigating,
            IncidentStatus::Closed,
            IncidentStatus::Archived,
            IncidentStatus::UnderReview,
            IncidentStatus::Resolved,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Pending => "pending",
            IncidentStatus::Published => "published",
            IncidentStatus::Rejected => "rejected",
            IncidentStatus::Investigating => "investigating",
            IncidentStatus::Closed => "closed",
            IncidentStatus::Archived => "archived",
            IncidentStatus::UnderReview => "under_review",
            IncidentStatus::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "ongoing" {
            return Ok(IncidentStatus::Investigating);
        }
        IncidentStatus::all()
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown incident status: {}", s))
    }
}

/// A logged incident or complaint, subject to staff review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "WireReport")]
pub struct IncidentReport {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_contact: Option<String>,
    /// Whether reporter identity is exposed in public views
    pub show_reporter: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub status: IncidentStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,

    // Legacy local log fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complainant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respondent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Incoming report shape.
///
/// The backend may send `_id`, `id` or both; `_id` wins.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireReport {
    #[serde(rename = "_id", default, deserialize_with = "optional_id")]
    backend_id: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "narrative")]
    description: Option<String>,
    #[serde(default)]
    short_description: Option<String>,
    #[serde(default)]
    reporter_name: Option<String>,
    #[serde(default)]
    reporter_contact: Option<String>,
    #[serde(default)]
    show_reporter: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    incident_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    status: IncidentStatus,
    #[serde(default)]
    attachments: Vec<Attachment>,
    #[serde(default)]
    complainant: Option<String>,
    #[serde(default)]
    respondent: Option<String>,
    #[serde(default)]
    incident_type: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl From<WireReport> for IncidentReport {
    fn from(wire: WireReport) -> Self {
        Self {
            id: wire.backend_id.or(wire.id).unwrap_or_default(),
            title: wire.title,
            description: wire.description,
            short_description: wire.short_description,
            reporter_name: wire.reporter_name,
            reporter_contact: wire.reporter_contact,
            show_reporter: wire.show_reporter,
            incident_date: wire.incident_date,
            created_at: wire.created_at,
            status: wire.status,
            attachments: wire.attachments,
            complainant: wire.complainant,
            respondent: wire.respondent,
            incident_type: wire.incident_type,
            date: wire.date,
        }
    }
}

impl IncidentReport {
    /// Description text for list previews, truncated to `max_chars`
    pub fn preview(&self, max_chars: usize) -> String {
        let text = self
            .description
            .as_deref()
            .or(self.short_description.as_deref())
            .unwrap_or("No description");
        text.chars().take(max_chars).collect()
    }

    /// Case-insensitive title match. Reports without a title never match.
    pub fn title_matches(&self, query: &str) -> bool {
        self.title
            .as_deref()
            .map(|t| t.to_lowercase().contains(&query.to_lowercase()))
            .unwrap_or(false)
    }

    /// Reporter name as shown publicly
    pub fn public_reporter(&self) -> Option<&str> {
        if self.show_reporter {
            self.reporter_name.as_deref()
        } else {
            None
        }
    }
}

/// Creation payload for an incident report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncidentReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter_contact: Option<String>,
    #[serde(default)]
    pub show_reporter: bool,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub incident_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complainant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respondent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Initial status; the backend ignores it, the local log honors it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IncidentStatus>,
}

/// Partial update for an incident report
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncidentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IncidentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_reporter: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complainant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respondent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl IncidentPatch {
    /// Status-only patch
    pub fn status(status: IncidentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Publish with the given reporter visibility
    pub fn publish(show_reporter: bool) -> Self {
        Self {
            status: Some(IncidentStatus::Published),
            show_reporter: Some(show_reporter),
            ..Default::default()
        }
    }

    /// Visibility-only patch
    pub fn visibility(show_reporter: bool) -> Self {
        Self {
            show_reporter: Some(show_reporter),
            ..Default::default()
        }
    }
}

impl Record for IncidentReport {
    type Draft = NewIncidentReport;
    type Patch = IncidentPatch;

    const RESOURCE: &'static str = "blotter";
    const STORAGE_KEY: &'static str = "blotters";

    fn id(&self) -> &str {
        &self.id
    }

    fn materialize(draft: NewIncidentReport, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            short_description: None,
            reporter_name: draft.reporter_name,
            reporter_contact: draft.reporter_contact,
            show_reporter: draft.show_reporter,
            incident_date: draft.incident_date,
            created_at: Some(now),
            status: draft.status.unwrap_or_default(),
            attachments: draft.attachments,
            complainant: draft.complainant,
            respondent: draft.respondent,
            incident_type: draft.incident_type,
            date: draft.date,
        }
    }

    fn apply(&mut self, patch: &IncidentPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(show) = patch.show_reporter {
            self.show_reporter = show;
        }
        if let Some(title) = &patch.title {
            self.title = Some(title.clone());
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(complainant) = &patch.complainant {
            self.complainant = Some(complainant.clone());
        }
        if let Some(respondent) = &patch.respondent {
            self.respondent = Some(respondent.clone());
        }
        if let Some(kind) = &patch.incident_type {
            self.incident_type = Some(kind.clone());
        }
        if let Some(date) = &patch.date {
            self.date = Some(date.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_backend_shape() {
        let json = r#"{
            "_id": "665f1c",
            "title": "Noise complaint",
            "description": "Karaoke past midnight",
            "reporterName": "Maria Santos",
            "showReporter": false,
            "createdAt": "2024-05-01T10:00:00Z",
            "status": "under_review",
            "attachments": [{"url": "https://cdn.example/a.jpg"}]
        }"#;

        let report: IncidentReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.id, "665f1c");
        assert_eq!(report.status, IncidentStatus::UnderReview);
        assert_eq!(report.attachments.len(), 1);
        assert_eq!(report.public_reporter(), None);
    }

    #[test]
    fn test_decode_legacy_local_shape() {
        let json = r#"{
            "id": 1714557600000,
            "date": "2024-05-01",
            "complainant": "Pedro",
            "respondent": "Jose",
            "incidentType": "Dispute",
            "narrative": "Boundary fence argument",
            "status": "ongoing"
        }"#;

        let report: IncidentReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.id, "1714557600000");
        assert_eq!(report.status, IncidentStatus::Investigating);
        assert_eq!(report.description.as_deref(), Some("Boundary fence argument"));
    }

    #[test]
    fn test_decode_with_both_id_keys() {
        let reports: Vec<IncidentReport> = serde_json::from_str(
            r#"[
                {"_id": "a1", "id": "a1", "title": "Noise", "status": "pending"},
                {"_id": "b2", "id": "virtual-b2", "status": "published"}
            ]"#,
        )
        .unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].id, "a1");
        assert_eq!(reports[1].id, "b2");

        // Re-encoded records carry a single `id`
        let json = serde_json::to_value(&reports[1]).unwrap();
        assert_eq!(json["id"], "b2");
        assert!(json.get("_id").is_none());
    }

    #[test]
    fn test_decode_date_only_incident_date() {
        let report: IncidentReport = serde_json::from_str(
            r#"{"_id": "a1", "incidentDate": "2024-05-01", "createdAt": "soon"}"#,
        )
        .unwrap();
        let day = report.incident_date.unwrap();
        assert_eq!(day.format("%Y-%m-%d").to_string(), "2024-05-01");
        assert!(report.created_at.is_none());
    }

    #[test]
    fn test_title_filter_skips_untitled() {
        let mut report: IncidentReport =
            serde_json::from_str(r#"{"id": "1", "status": "pending"}"#).unwrap();
        assert!(!report.title_matches(""));

        report.title = Some("Stray Dogs on Purok 3".to_string());
        assert!(report.title_matches("stray"));
        assert!(report.title_matches(""));
        assert!(!report.title_matches("flood"));
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = IncidentPatch::publish(true);
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "published", "showReporter": true})
        );
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "Under_Review".parse::<IncidentStatus>().unwrap(),
            IncidentStatus::UnderReview
        );
        assert_eq!(
            "ongoing".parse::<IncidentStatus>().unwrap(),
            IncidentStatus::Investigating
        );
        assert!("lost".parse::<IncidentStatus>().is_err());
    }

    #[test]
    fn test_preview_truncates() {
        let report: IncidentReport = serde_json::from_str(
            r#"{"id": "1", "description": "abcdefghij"}"#,
        )
        .unwrap();
        assert_eq!(report.preview(4), "abcd");
    }
}
