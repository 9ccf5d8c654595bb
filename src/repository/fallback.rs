//! Remote-then-local repository

use async_trait::async_trait;
use std::future::Future;

use super::{Created, DocumentRepository, FallbackPolicy, ReportRepository, Repository};
use crate::error::RecordsResult;
use crate::model::{DocumentRequest, IncidentReport, Record};

/// Combines a remote and a local repository under explicit policies.
///
/// Reads (`list`, `get`, lookups) follow `reads`; writes (`create`, `update`,
/// `delete`) follow `writes`. Under [`FallbackPolicy::PreferRemote`] any
/// remote failure, or a remote "not found" on a lookup, is retried against the
/// local store. When both fail, the remote error is returned.
pub struct FallbackRepository<P, L> {
    remote: P,
    local: L,
    reads: FallbackPolicy,
    writes: FallbackPolicy,
}

impl<P, L> FallbackRepository<P, L> {
    /// Both policies default to [`FallbackPolicy::PreferRemote`]
    pub fn new(remote: P, local: L) -> Self {
        Self {
            remote,
            local,
            reads: FallbackPolicy::default(),
            writes: FallbackPolicy::default(),
        }
    }

    /// Builder method: set the read policy
    pub fn reads(mut self, policy: FallbackPolicy) -> Self {
        self.reads = policy;
        self
    }

    /// Builder method: set the write policy
    pub fn writes(mut self, policy: FallbackPolicy) -> Self {
        self.writes = policy;
        self
    }
}

async fn route<T, FR, FL>(
    policy: FallbackPolicy,
    operation: &str,
    remote: FR,
    local: FL,
) -> RecordsResult<T>
where
    FR: Future<Output = RecordsResult<T>>,
    FL: Future<Output = RecordsResult<T>>,
{
    match policy {
        FallbackPolicy::RemoteOnly => remote.await,
        FallbackPolicy::LocalOnly => local.await,
        FallbackPolicy::PreferRemote => match remote.await {
            Ok(value) => Ok(value),
            Err(remote_err) => {
                tracing::warn!(
                    operation = operation,
                    error = %remote_err,
                    "Remote call failed, falling back to local store"
                );
                local.await.map_err(|local_err| {
                    tracing::warn!(operation = operation, error = %local_err, "Local fallback failed");
                    remote_err
                })
            }
        },
    }
}

#[async_trait]
impl<R, P, L> Repository<R> for FallbackRepository<P, L>
where
    R: Record,
    P: Repository<R>,
    L: Repository<R>,
{
    fn source(&self) -> &'static str {
        match self.reads {
            FallbackPolicy::RemoteOnly => "remote",
            FallbackPolicy::LocalOnly => "local",
            FallbackPolicy::PreferRemote => "remote+local",
        }
    }

    async fn list(&self) -> RecordsResult<Vec<R>> {
        route(self.reads, "list", self.remote.list(), self.local.list()).await
    }

    async fn get(&self, id: &str) -> RecordsResult<R> {
        route(self.reads, "get", self.remote.get(id), self.local.get(id)).await
    }

    async fn create(&self, draft: R::Draft) -> RecordsResult<Created<R>> {
        let remote = self.remote.create(draft.clone());
        let local = self.local.create(draft);
        route(self.writes, "create", remote, local).await
    }

    async fn update(&self, id: &str, patch: &R::Patch) -> RecordsResult<()> {
        route(
            self.writes,
            "update",
            self.remote.update(id, patch),
            self.local.update(id, patch),
        )
        .await
    }

    async fn delete(&self, id: &str) -> RecordsResult<()> {
        route(
            self.writes,
            "delete",
            self.remote.delete(id),
            self.local.delete(id),
        )
        .await
    }
}

#[async_trait]
impl<P, L> ReportRepository for FallbackRepository<P, L>
where
    P: ReportRepository,
    L: ReportRepository,
{
    async fn list_pending(&self) -> RecordsResult<Vec<IncidentReport>> {
        route(
            self.reads,
            "list_pending",
            self.remote.list_pending(),
            self.local.list_pending(),
        )
        .await
    }

    async fn get_detailed(&self, id: &str) -> RecordsResult<IncidentReport> {
        route(
            self.reads,
            "get_detailed",
            self.remote.get_detailed(id),
            self.local.get_detailed(id),
        )
        .await
    }
}

#[async_trait]
impl<P, L> DocumentRepository for FallbackRepository<P, L>
where
    P: DocumentRepository,
    L: DocumentRepository,
{
    async fn find_by_tracking(&self, number: &str) -> RecordsResult<Option<DocumentRequest>> {
        match self.reads {
            FallbackPolicy::RemoteOnly => self.remote.find_by_tracking(number).await,
            FallbackPolicy::LocalOnly => self.local.find_by_tracking(number).await,
            FallbackPolicy::PreferRemote => match self.remote.find_by_tracking(number).await {
                Ok(Some(doc)) => Ok(Some(doc)),
                Ok(None) => self.local.find_by_tracking(number).await,
                Err(remote_err) => {
                    tracing::warn!(
                        operation = "find_by_tracking",
                        error = %remote_err,
                        "Remote call failed, falling back to local store"
                    );
                    self.local.find_by_tracking(number).await.map_err(|local_err| {
                        tracing::warn!(
                            operation = "find_by_tracking",
                            error = %local_err,
                            "Local fallback failed"
                        );
                        remote_err
                    })
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientConfig, RecordsClient};
    use crate::model::{DocumentType, NewDocumentRequest};
    use crate::repository::{LocalRepository, Origin, RemoteRepository};
    use crate::store::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    fn offline_remote() -> RemoteRepository<DocumentRequest> {
        let client = RecordsClient::new(ClientConfig {
            base_url: "http://127.0.0.1:9/api".to_string(),
            timeout_ms: 500,
        })
        .unwrap();
        RemoteRepository::new(client)
    }

    fn draft(pickup: bool) -> NewDocumentRequest {
        NewDocumentRequest {
            resident_name: "Juan Dela Cruz".to_string(),
            document_type: DocumentType::BarangayClearance,
            pickup,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_prefer_remote_write_falls_back() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let local: LocalRepository<DocumentRequest> = LocalRepository::new(Arc::clone(&store));
        let repo = FallbackRepository::new(offline_remote(), local);

        let created = repo.create(draft(true)).await.unwrap();
        assert_eq!(created.origin, Origin::Local);
        assert!(created.record.is_local());
        assert!(created.record.pickup_code.is_some());

        let local: LocalRepository<DocumentRequest> = LocalRepository::new(store);
        assert_eq!(local.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remote_only_surfaces_error() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let local: LocalRepository<DocumentRequest> = LocalRepository::new(Arc::clone(&store));
        let repo = FallbackRepository::new(offline_remote(), local).writes(FallbackPolicy::RemoteOnly);

        let err = repo.create(draft(false)).await.unwrap_err();
        assert!(err.is_remote());
        assert!(store.get("documents").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tracking_lookup_falls_back() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let local: LocalRepository<DocumentRequest> = LocalRepository::new(Arc::clone(&store));
        let created = local.create(draft(false)).await.unwrap();

        let repo = FallbackRepository::new(offline_remote(), local);
        let found = repo
            .find_by_tracking(&created.record.tracking_number)
            .await
            .unwrap();
        assert_eq!(found.map(|d| d.id), Some(created.record.id));
    }

    #[tokio::test]
    async fn test_both_fail_returns_remote_error() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let local: LocalRepository<DocumentRequest> = LocalRepository::new(store);
        let repo = FallbackRepository::new(offline_remote(), local);

        let err = repo.get("missing").await.unwrap_err();
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn test_tracking_lookup_both_fail_returns_remote_error() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set("documents", "not json").unwrap();
        let local: LocalRepository<DocumentRequest> = LocalRepository::new(store);
        let repo = FallbackRepository::new(offline_remote(), local);

        let err = repo
            .find_by_tracking("ABIS-20240501-123456")
            .await
            .unwrap_err();
        assert!(err.is_remote());
    }
}
