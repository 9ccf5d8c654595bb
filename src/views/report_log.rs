//! Local-only blotter log
//!
//! A plain list of blotter entries kept on this device under the `blotters`
//! key. It predates the reviewed report workflow and never talks to the
//! backend.

use chrono::NaiveDate;
use std::sync::Arc;

use super::CollectionState;
use crate::error::{RecordsError, RecordsResult};
use crate::model::{IncidentPatch, IncidentReport, IncidentStatus, NewIncidentReport};
use crate::repository::{LocalRepository, Repository};
use crate::store::KeyValueStore;

/// Incident types offered by the log form
pub const INCIDENT_TYPES: &[&str] = &["Dispute", "Theft", "Assault", "Disturbance"];

/// Statuses offered by the log form
const LOG_STATUSES: &[IncidentStatus] = &[
    IncidentStatus::Pending,
    IncidentStatus::Resolved,
    IncidentStatus::Investigating,
];

/// A log entry as typed into the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntryForm {
    /// `YYYY-MM-DD`
    pub date: String,
    pub complainant: String,
    pub respondent: String,
    pub incident_type: String,
    pub narrative: String,
    pub status: IncidentStatus,
}

impl Default for LogEntryForm {
    fn default() -> Self {
        Self {
            date: String::new(),
            complainant: String::new(),
            respondent: String::new(),
            incident_type: String::new(),
            narrative: String::new(),
            status: IncidentStatus::Pending,
        }
    }
}

impl LogEntryForm {
    /// Prefill from an existing entry
    pub fn from_entry(entry: &IncidentReport) -> Self {
        Self {
            date: entry.date.clone().unwrap_or_default(),
            complainant: entry.complainant.clone().unwrap_or_default(),
            respondent: entry.respondent.clone().unwrap_or_default(),
            incident_type: entry.incident_type.clone().unwrap_or_default(),
            narrative: entry.description.clone().unwrap_or_default(),
            status: entry.status,
        }
    }

    pub fn validate(&self) -> RecordsResult<()> {
        if NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").is_err() {
            return Err(RecordsError::Validation(
                "Date must be YYYY-MM-DD".to_string(),
            ));
        }
        if self.complainant.trim().is_empty() {
            return Err(RecordsError::Validation(
                "Complainant name is required".to_string(),
            ));
        }
        if self.respondent.trim().is_empty() {
            return Err(RecordsError::Validation(
                "Respondent name is required".to_string(),
            ));
        }
        if !INCIDENT_TYPES.contains(&self.incident_type.as_str()) {
            return Err(RecordsError::Validation(format!(
                "Incident type must be one of: {}",
                INCIDENT_TYPES.join(", ")
            )));
        }
        if !LOG_STATUSES.contains(&self.status) {
            return Err(RecordsError::Validation(format!(
                "Status {} is not used by the log",
                self.status
            )));
        }
        Ok(())
    }

    fn into_draft(self) -> NewIncidentReport {
        NewIncidentReport {
            date: Some(self.date.trim().to_string()),
            complainant: Some(self.complainant.trim().to_string()),
            respondent: Some(self.respondent.trim().to_string()),
            incident_type: Some(self.incident_type),
            description: non_empty(self.narrative),
            status: Some(self.status),
            ..Default::default()
        }
    }

    fn into_patch(self) -> IncidentPatch {
        IncidentPatch {
            status: Some(self.status),
            description: Some(self.narrative),
            complainant: Some(self.complainant.trim().to_string()),
            respondent: Some(self.respondent.trim().to_string()),
            incident_type: Some(self.incident_type),
            date: Some(self.date.trim().to_string()),
            ..Default::default()
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Controller for the local blotter log
pub struct ReportLog {
    repo: LocalRepository<IncidentReport>,
    entries: CollectionState<IncidentReport>,
}

impl ReportLog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            repo: LocalRepository::new(store),
            entries: CollectionState::new(),
        }
    }

    pub async fn load(&mut self) -> bool {
        let repo = self.repo.clone();
        self.entries.load(async move { repo.list().await }).await
    }

    pub fn entries(&self) -> &[IncidentReport] {
        self.entries.items()
    }

    pub fn error(&self) -> Option<&str> {
        self.entries.error()
    }

    pub async fn add(&mut self, form: LogEntryForm) -> RecordsResult<IncidentReport> {
        form.validate()?;
        let created = self.repo.create(form.into_draft()).await?;
        self.load().await;
        Ok(created.record)
    }

    /// Replace an entry's fields with the form contents
    pub async fn edit(&mut self, id: &str, form: LogEntryForm) -> RecordsResult<()> {
        form.validate()?;
        self.repo.update(id, &form.into_patch()).await?;
        self.load().await;
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> RecordsResult<()> {
        self.repo.delete(id).await?;
        self.load().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{load_json, MemoryStore};

    fn form() -> LogEntryForm {
        LogEntryForm {
            date: "2024-05-01".to_string(),
            complainant: "Pedro Cruz".to_string(),
            respondent: "Jose Rizal".to_string(),
            incident_type: "Dispute".to_string(),
            narrative: "Boundary fence argument".to_string(),
            status: IncidentStatus::Pending,
        }
    }

    #[test]
    fn test_validation() {
        assert!(form().validate().is_ok());

        let mut bad = form();
        bad.date = "May 1".to_string();
        assert!(bad.validate().is_err());

        let mut bad = form();
        bad.incident_type = "Jaywalking".to_string();
        assert!(bad.validate().is_err());

        let mut bad = form();
        bad.status = IncidentStatus::Published;
        assert!(bad.validate().is_err());
    }

    #[tokio::test]
    async fn test_add_edit_delete() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut log = ReportLog::new(Arc::clone(&store));

        let entry = log.add(form()).await.unwrap();
        assert_eq!(log.entries().len(), 1);
        assert!(entry.id.parse::<i64>().is_ok());

        let mut changed = LogEntryForm::from_entry(&entry);
        changed.status = IncidentStatus::Investigating;
        log.edit(&entry.id, changed).await.unwrap();
        assert_eq!(log.entries()[0].status, IncidentStatus::Investigating);

        let raw: Vec<serde_json::Value> = load_json(store.as_ref(), "blotters").unwrap().unwrap();
        assert_eq!(raw[0]["complainant"], "Pedro Cruz");

        log.delete(&entry.id).await.unwrap();
        assert!(log.entries().is_empty());
        assert!(log.delete(&entry.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_reads_legacy_numeric_ids() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store
            .set(
                "blotters",
                r#"[{"id": 1714557600000, "date": "2024-05-01", "complainant": "A",
                     "respondent": "B", "incidentType": "Theft", "status": "ongoing"}]"#,
            )
            .unwrap();

        let mut log = ReportLog::new(store);
        assert!(log.load().await);
        assert_eq!(log.entries()[0].id, "1714557600000");

        log.edit("1714557600000", form()).await.unwrap();
        assert_eq!(log.entries()[0].incident_type.as_deref(), Some("Dispute"));
    }

    #[tokio::test]
    async fn test_corrupt_store_sets_error() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set("blotters", "not json").unwrap();

        let mut log = ReportLog::new(store);
        assert!(!log.load().await);
        assert!(log.entries().is_empty());
        assert!(log.error().is_some());
    }
}
