//! Local-store repository

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use super::{Created, DocumentRepository, Origin, ReportRepository, Repository};
use crate::error::{RecordsError, RecordsResult};
use crate::model::{DocumentRequest, IncidentReport, IncidentStatus, Record};
use crate::store::{KeyValueStore, LocalCollection};

/// Repository over the JSON collection `R::STORAGE_KEY`
pub struct LocalRepository<R> {
    items: LocalCollection<R>,
}

impl<R> Clone for LocalRepository<R> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<R: Record> LocalRepository<R> {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            items: LocalCollection::new(store, R::STORAGE_KEY),
        }
    }

    fn not_found(id: &str) -> RecordsError {
        RecordsError::NotFound(format!("{} {} (local)", R::RESOURCE, id))
    }
}

/// Local ids are creation millis, bumped past any id already taken
fn next_local_id<R: Record>(items: &[R], now_millis: i64) -> String {
    let mut candidate = now_millis;
    while items.iter().any(|r| r.id() == candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}

#[async_trait]
impl<R: Record> Repository<R> for LocalRepository<R> {
    fn source(&self) -> &'static str {
        "local"
    }

    async fn list(&self) -> RecordsResult<Vec<R>> {
        self.items.load()
    }

    async fn get(&self, id: &str) -> RecordsResult<R> {
        self.items
            .load()?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, draft: R::Draft) -> RecordsResult<Created<R>> {
        let now = Utc::now();
        let mut items = self.items.load()?;
        let id = next_local_id(&items, now.timestamp_millis());
        let record = R::materialize(draft, id, now);

        items.push(record.clone());
        self.items.save(&items)?;

        tracing::info!(key = self.items.key(), id = %record.id(), "Created record in local store");
        Ok(Created {
            record,
            origin: Origin::Local,
        })
    }

    async fn update(&self, id: &str, patch: &R::Patch) -> RecordsResult<()> {
        let mut items = self.items.load()?;
        let record = items
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        record.apply(patch);
        self.items.save(&items)
    }

    async fn delete(&self, id: &str) -> RecordsResult<()> {
        let mut items = self.items.load()?;
        let before = items.len();
        items.retain(|r| r.id() != id);
        if items.len() == before {
            return Err(Self::not_found(id));
        }
        self.items.save(&items)?;
        tracing::info!(key = self.items.key(), id = %id, "Deleted record from local store");
        Ok(())
    }
}

#[async_trait]
impl ReportRepository for LocalRepository<IncidentReport> {
    async fn list_pending(&self) -> RecordsResult<Vec<IncidentReport>> {
        Ok(self
            .items
            .load()?
            .into_iter()
            .filter(|r| r.status == IncidentStatus::Pending)
            .collect())
    }

    async fn get_detailed(&self, id: &str) -> RecordsResult<IncidentReport> {
        self.get(id).await
    }
}

#[async_trait]
impl DocumentRepository for LocalRepository<DocumentRequest> {
    async fn find_by_tracking(&self, number: &str) -> RecordsResult<Option<DocumentRequest>> {
        Ok(self
            .items
            .load()?
            .into_iter()
            .find(|d| d.has_tracking_number(number)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentType, IncidentPatch, NewDocumentRequest, NewIncidentReport};
    use crate::store::MemoryStore;

    fn store() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_create_list_update_delete() {
        let repo: LocalRepository<IncidentReport> = LocalRepository::new(store());

        let created = repo
            .create(NewIncidentReport {
                title: Some("Flooded road".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.origin, Origin::Local);
        let id = created.record.id.clone();

        repo.update(&id, &IncidentPatch::status(IncidentStatus::Resolved))
            .await
            .unwrap();
        assert_eq!(repo.get(&id).await.unwrap().status, IncidentStatus::Resolved);

        repo.delete(&id).await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());
        assert!(repo.delete(&id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_ids_unique_within_same_millisecond() {
        let repo: LocalRepository<IncidentReport> = LocalRepository::new(store());
        let a = repo.create(NewIncidentReport::default()).await.unwrap();
        let b = repo.create(NewIncidentReport::default()).await.unwrap();
        assert_ne!(a.record.id, b.record.id);
    }

    #[tokio::test]
    async fn test_pending_filter() {
        let repo: LocalRepository<IncidentReport> = LocalRepository::new(store());
        let a = repo.create(NewIncidentReport::default()).await.unwrap();
        repo.create(NewIncidentReport::default()).await.unwrap();
        repo.update(&a.record.id, &IncidentPatch::publish(false))
            .await
            .unwrap();

        let pending = repo.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_ne!(pending[0].id, a.record.id);
    }

    #[tokio::test]
    async fn test_find_by_tracking_case_insensitive() {
        let repo: LocalRepository<DocumentRequest> = LocalRepository::new(store());
        let created = repo
            .create(NewDocumentRequest {
                resident_name: "Ana Reyes".to_string(),
                document_type: DocumentType::Residency,
                ..Default::default()
            })
            .await
            .unwrap();

        let number = created.record.tracking_number.to_lowercase();
        let found = repo.find_by_tracking(&number).await.unwrap();
        assert_eq!(found.map(|d| d.id), Some(created.record.id));
        assert!(repo.find_by_tracking("ABIS-0").await.unwrap().is_none());
    }
}
