//! Resident document request form

use std::sync::Arc;

use super::LoadingFlag;
use crate::error::RecordsResult;
use crate::model::{DocumentRequest, DocumentType, NewDocumentRequest};
use crate::repository::{DocumentRepository, Origin};

/// What the resident is shown after submitting
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub tracking_number: String,
    /// Present only when pickup was requested
    pub pickup_code: Option<String>,
    pub origin: Origin,
    pub record: DocumentRequest,
}

impl Submission {
    /// Whether the request was only saved on this device
    pub fn is_offline(&self) -> bool {
        self.origin == Origin::Local
    }
}

/// Controller for the "request a document" screen
pub struct DocumentRequestForm {
    repo: Arc<dyn DocumentRepository>,
    pub draft: NewDocumentRequest,
    submitting: LoadingFlag,
    error: Option<String>,
    last: Option<Submission>,
}

impl DocumentRequestForm {
    pub fn new(repo: Arc<dyn DocumentRepository>) -> Self {
        Self {
            repo,
            draft: NewDocumentRequest::default(),
            submitting: LoadingFlag::new(),
            error: None,
            last: None,
        }
    }

    /// Switch document type; extra fields of the previous type are dropped
    pub fn select_type(&mut self, kind: DocumentType) {
        if self.draft.document_type != kind {
            self.draft.document_type = kind;
            self.draft.form_fields.clear();
        }
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.draft.form_fields.insert(name.to_string(), value.into());
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_set()
    }

    pub fn loading_flag(&self) -> LoadingFlag {
        self.submitting.clone()
    }

    pub fn last_submission(&self) -> Option<&Submission> {
        self.last.as_ref()
    }

    /// Validate and submit the draft.
    ///
    /// On success the draft is reset, keeping the selected document type.
    pub async fn submit(&mut self) -> RecordsResult<Submission> {
        if let Err(e) = self.draft.validate() {
            self.error = Some(e.user_message());
            return Err(e);
        }

        let _guard = self.submitting.acquire();
        let mut draft = self.draft.clone();
        draft.resident_name = draft.resident_name.trim().to_string();

        match self.repo.create(draft).await {
            Ok(created) => {
                let submission = Submission {
                    tracking_number: created.record.tracking_number.clone(),
                    pickup_code: created.record.pickup_code.clone(),
                    origin: created.origin,
                    record: created.record,
                };
                tracing::info!(
                    tracking_number = %submission.tracking_number,
                    origin = %submission.origin,
                    "Document request submitted"
                );
                self.error = None;
                self.draft = NewDocumentRequest {
                    document_type: self.draft.document_type,
                    ..Default::default()
                };
                self.last = Some(submission.clone());
                Ok(submission)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Document request failed");
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::testing::FaultyRepository;

    fn clearance(name: &str) -> NewDocumentRequest {
        let mut draft = NewDocumentRequest {
            resident_name: name.to_string(),
            document_type: DocumentType::BarangayClearance,
            ..Default::default()
        };
        draft
            .form_fields
            .insert("purpose".to_string(), "employment".to_string());
        draft
    }

    #[tokio::test]
    async fn test_submit_resets_draft() {
        let repo = FaultyRepository::<DocumentRequest>::new();
        let mut form = DocumentRequestForm::new(repo.clone());
        form.draft = clearance("Juan Dela Cruz");
        form.draft.pickup = true;

        let submission = form.submit().await.unwrap();
        assert!(!submission.tracking_number.is_empty());
        assert_eq!(submission.pickup_code.as_deref().map(str::len), Some(6));
        assert!(form.draft.resident_name.is_empty());
        assert_eq!(form.draft.document_type, DocumentType::BarangayClearance);
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn test_invalid_draft_sends_nothing() {
        let repo = FaultyRepository::<DocumentRequest>::new();
        let mut form = DocumentRequestForm::new(repo.clone());

        assert!(form.submit().await.is_err());
        assert!(form.error().is_some());
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_draft() {
        let repo = FaultyRepository::<DocumentRequest>::new();
        repo.set_offline(true);
        let mut form = DocumentRequestForm::new(repo.clone());
        form.draft = clearance("Juan Dela Cruz");

        assert!(form.submit().await.is_err());
        assert_eq!(form.draft.resident_name, "Juan Dela Cruz");
        assert!(form.last_submission().is_none());
    }

    #[test]
    fn test_select_type_drops_fields() {
        let repo = FaultyRepository::<DocumentRequest>::new();
        let mut form = DocumentRequestForm::new(repo);
        form.set_field("purpose", "travel");
        form.select_type(DocumentType::BarangayClearance);
        assert_eq!(form.draft.form_fields.len(), 1);

        form.select_type(DocumentType::Death);
        assert!(form.draft.form_fields.is_empty());
    }
}
