//! Resident incident report submission

use std::sync::Arc;

use super::LoadingFlag;
use crate::error::{RecordsError, RecordsResult};
use crate::model::{IncidentReport, NewIncidentReport};
use crate::repository::ReportRepository;

/// Controller for the "report an incident" screen.
///
/// Reports go to the backend only; there is no offline copy.
pub struct ReportForm {
    repo: Arc<dyn ReportRepository>,
    pub draft: NewIncidentReport,
    submitting: LoadingFlag,
    error: Option<String>,
}

impl ReportForm {
    pub fn new(repo: Arc<dyn ReportRepository>) -> Self {
        Self {
            repo,
            draft: NewIncidentReport::default(),
            submitting: LoadingFlag::new(),
            error: None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_set()
    }

    fn validate(&self) -> RecordsResult<()> {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, |s| s.trim().is_empty());
        if blank(&self.draft.title) {
            return Err(RecordsError::Validation("Title is required".to_string()));
        }
        if blank(&self.draft.description) {
            return Err(RecordsError::Validation(
                "Description is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate and submit; the draft is cleared on success
    pub async fn submit(&mut self) -> RecordsResult<IncidentReport> {
        if let Err(e) = self.validate() {
            self.error = Some(e.user_message());
            return Err(e);
        }

        let _guard = self.submitting.acquire();
        // Status is assigned by the backend
        let draft = NewIncidentReport {
            status: None,
            ..self.draft.clone()
        };

        match self.repo.create(draft).await {
            Ok(created) => {
                tracing::info!(id = %created.record.id, origin = %created.origin, "Incident report submitted");
                self.draft = NewIncidentReport::default();
                self.error = None;
                Ok(created.record)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Incident report submission failed");
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}
