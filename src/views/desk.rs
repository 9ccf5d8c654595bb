//! Staff list of document requests

use std::sync::Arc;

use super::{CollectionState, LoadingFlag, Lookup};
use crate::error::{RecordsError, RecordsResult};
use crate::model::{DocumentPatch, DocumentRequest, DocumentStatus, DocumentType};
use crate::repository::DocumentRepository;

/// List filters; `None` means "all"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilters {
    pub search: String,
    pub status: Option<DocumentStatus>,
    pub document_type: Option<DocumentType>,
}

impl DocumentFilters {
    pub fn matches(&self, doc: &DocumentRequest) -> bool {
        let search = self.search.trim();
        (search.is_empty() || doc.matches_search(search))
            && self.status.map_or(true, |s| doc.status == s)
            && self.document_type.map_or(true, |t| doc.document_type == t)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Fields a staff member can edit in place
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentEdit {
    pub status: DocumentStatus,
    pub resident_name: String,
    pub document_type: DocumentType,
}

impl From<&DocumentRequest> for DocumentEdit {
    fn from(doc: &DocumentRequest) -> Self {
        Self {
            status: doc.status,
            resident_name: doc.resident_name.clone(),
            document_type: doc.document_type,
        }
    }
}

impl From<DocumentEdit> for DocumentPatch {
    fn from(edit: DocumentEdit) -> Self {
        DocumentPatch {
            status: Some(edit.status),
            resident_name: Some(edit.resident_name),
            document_type: Some(edit.document_type),
            remarks: None,
        }
    }
}

/// Controller for the document requests screen
pub struct DocumentDesk {
    repo: Arc<dyn DocumentRepository>,
    requests: CollectionState<DocumentRequest>,
    pub filters: DocumentFilters,
}

impl DocumentDesk {
    pub fn new(repo: Arc<dyn DocumentRepository>) -> Self {
        Self {
            repo,
            requests: CollectionState::new(),
            filters: DocumentFilters::default(),
        }
    }

    pub async fn load(&mut self) -> bool {
        let repo = Arc::clone(&self.repo);
        self.requests.load(async move { repo.list().await }).await
    }

    pub fn requests(&self) -> &[DocumentRequest] {
        self.requests.items()
    }

    pub fn filtered(&self) -> Vec<&DocumentRequest> {
        self.requests
            .items()
            .iter()
            .filter(|d| self.filters.matches(d))
            .collect()
    }

    pub fn error(&self) -> Option<&str> {
        self.requests.error()
    }

    pub fn is_loading(&self) -> bool {
        self.requests.is_loading()
    }

    pub fn loading_flag(&self) -> LoadingFlag {
        self.requests.loading_flag()
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Number of loaded requests with the given status
    pub fn count(&self, status: DocumentStatus) -> usize {
        self.requests
            .items()
            .iter()
            .filter(|d| d.status == status)
            .count()
    }

    /// Counts for every status, in status order
    pub fn status_counts(&self) -> Vec<(DocumentStatus, usize)> {
        DocumentStatus::all()
            .iter()
            .map(|s| (*s, self.count(*s)))
            .collect()
    }

    pub async fn view_detail(&self, id: &str) -> RecordsResult<Lookup<DocumentRequest>> {
        Lookup::from_result(self.repo.get(id).await)
    }

    pub async fn change_status(&mut self, id: &str, status: DocumentStatus) -> RecordsResult<()> {
        self.mutate(id, DocumentPatch::status(status)).await
    }

    pub async fn save_edit(&mut self, id: &str, edit: DocumentEdit) -> RecordsResult<()> {
        if edit.resident_name.trim().is_empty() {
            let err = RecordsError::Validation("Resident name is required".to_string());
            self.requests.set_error(err.user_message());
            return Err(err);
        }
        self.mutate(id, edit.into()).await
    }

    pub async fn delete(&mut self, id: &str) -> RecordsResult<()> {
        match self.repo.delete(id).await {
            Ok(()) => {
                self.load().await;
                Ok(())
            }
            Err(e) => {
                self.requests.set_error(e.user_message());
                Err(e)
            }
        }
    }

    async fn mutate(&mut self, id: &str, patch: DocumentPatch) -> RecordsResult<()> {
        match self.repo.update(id, &patch).await {
            Ok(()) => {
                self.load().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Document update failed");
                self.requests.set_error(e.user_message());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewDocumentRequest;
    use crate::views::testing::FaultyRepository;

    fn draft(name: &str, kind: DocumentType) -> NewDocumentRequest {
        NewDocumentRequest {
            resident_name: name.to_string(),
            document_type: kind,
            ..Default::default()
        }
    }

    async fn desk() -> (DocumentDesk, Arc<FaultyRepository<DocumentRequest>>, Vec<DocumentRequest>) {
        let repo = FaultyRepository::new();
        let docs = vec![
            repo.seed(draft("Juan Dela Cruz", DocumentType::BarangayClearance)).await,
            repo.seed(draft("Maria Santos", DocumentType::Indigency)).await,
            repo.seed(draft("Pedro Penduko", DocumentType::BarangayClearance)).await,
        ];
        let mut desk = DocumentDesk::new(repo.clone());
        desk.load().await;
        (desk, repo, docs)
    }

    #[tokio::test]
    async fn test_filters_combine() {
        let (mut desk, _, docs) = desk().await;
        assert_eq!(desk.filtered().len(), 3);

        desk.filters.search = "santos".to_string();
        assert_eq!(desk.filtered().len(), 1);

        desk.filters.search = docs[0].tracking_number.to_lowercase();
        assert_eq!(desk.filtered()[0].id, docs[0].id);

        desk.clear_filters();
        desk.filters.document_type = Some(DocumentType::BarangayClearance);
        assert_eq!(desk.filtered().len(), 2);

        desk.filters.status = Some(DocumentStatus::Approved);
        assert!(desk.filtered().is_empty());
    }

    #[tokio::test]
    async fn test_change_status_refetches() {
        let (mut desk, repo, docs) = desk().await;
        desk.change_status(&docs[1].id, DocumentStatus::ReadyForPickup)
            .await
            .unwrap();

        assert_eq!(desk.count(DocumentStatus::ReadyForPickup), 1);
        assert_eq!(desk.count(DocumentStatus::Pending), 2);
        let lists = repo.calls().iter().filter(|c| *c == "list").count();
        assert_eq!(lists, 2);
    }

    #[tokio::test]
    async fn test_save_edit() {
        let (mut desk, _, docs) = desk().await;
        let mut edit = DocumentEdit::from(&docs[0]);
        edit.resident_name = "Juana Dela Cruz".to_string();
        edit.document_type = DocumentType::Residency;
        desk.save_edit(&docs[0].id, edit).await.unwrap();

        let doc = desk.requests().iter().find(|d| d.id == docs[0].id).unwrap();
        assert_eq!(doc.resident_name, "Juana Dela Cruz");
        assert_eq!(doc.document_type, DocumentType::Residency);
        assert_eq!(doc.tracking_number, docs[0].tracking_number);
    }

    #[tokio::test]
    async fn test_blank_name_edit_rejected() {
        let (mut desk, repo, docs) = desk().await;
        let mut edit = DocumentEdit::from(&docs[0]);
        edit.resident_name = "  ".to_string();

        assert!(desk.save_edit(&docs[0].id, edit).await.is_err());
        assert!(!repo.calls().iter().any(|c| c.starts_with("update:")));
    }

    #[tokio::test]
    async fn test_delete_and_failure() {
        let (mut desk, repo, docs) = desk().await;
        desk.delete(&docs[2].id).await.unwrap();
        assert_eq!(desk.requests().len(), 2);

        repo.fail_record(&docs[0].id);
        assert!(desk.delete(&docs[0].id).await.is_err());
        assert_eq!(desk.requests().len(), 2);
        assert!(desk.error().is_some());
    }

    #[tokio::test]
    async fn test_status_counts_cover_every_status() {
        let (desk, _, _) = desk().await;
        let counts = desk.status_counts();
        assert_eq!(counts.len(), DocumentStatus::all().len());
        assert_eq!(counts[0], (DocumentStatus::Pending, 3));
    }

    #[tokio::test]
    async fn test_view_detail() {
        let (desk, _, docs) = desk().await;
        let found = desk.view_detail(&docs[1].id).await.unwrap();
        assert_eq!(found.found().map(|d| d.resident_name.as_str()), Some("Maria Santos"));
        assert_eq!(desk.view_detail("missing").await.unwrap(), Lookup::NotFound);
    }
}
