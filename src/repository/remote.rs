//! Backend-backed repository

use async_trait::async_trait;
use std::marker::PhantomData;

use super::{Created, DocumentRepository, Origin, ReportRepository, Repository};
use crate::client::RecordsClient;
use crate::error::RecordsResult;
use crate::model::{DocumentRequest, IncidentReport, Record};

/// Repository over the REST resource `R::RESOURCE`
pub struct RemoteRepository<R> {
    client: RecordsClient,
    _marker: PhantomData<fn() -> R>,
}

impl<R> Clone for RemoteRepository<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R: Record> RemoteRepository<R> {
    pub fn new(client: RecordsClient) -> Self {
        Self {
            client,
            _marker: PhantomData,
        }
    }

    pub fn client(&self) -> &RecordsClient {
        &self.client
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", R::RESOURCE, urlencoding::encode(id))
    }
}

#[async_trait]
impl<R: Record> Repository<R> for RemoteRepository<R> {
    fn source(&self) -> &'static str {
        "remote"
    }

    async fn list(&self) -> RecordsResult<Vec<R>> {
        self.client.get_collection(R::RESOURCE).await
    }

    async fn get(&self, id: &str) -> RecordsResult<R> {
        self.client.get_json(&Self::item_path(id)).await
    }

    async fn create(&self, draft: R::Draft) -> RecordsResult<Created<R>> {
        let record: R = self.client.post_json(R::RESOURCE, &draft).await?;
        tracing::info!(resource = R::RESOURCE, id = %record.id(), "Created record on backend");
        Ok(Created {
            record,
            origin: Origin::Remote,
        })
    }

    async fn update(&self, id: &str, patch: &R::Patch) -> RecordsResult<()> {
        self.client.patch_json(&Self::item_path(id), patch).await
    }

    async fn delete(&self, id: &str) -> RecordsResult<()> {
        self.client.delete(&Self::item_path(id)).await?;
        tracing::info!(resource = R::RESOURCE, id = %id, "Deleted record on backend");
        Ok(())
    }
}

#[async_trait]
impl ReportRepository for RemoteRepository<IncidentReport> {
    async fn list_pending(&self) -> RecordsResult<Vec<IncidentReport>> {
        self.client.get_collection("blotter/pending").await
    }

    async fn get_detailed(&self, id: &str) -> RecordsResult<IncidentReport> {
        self.client
            .get_json_with_query(&Self::item_path(id), &[("admin", "1")])
            .await
    }
}

#[async_trait]
impl DocumentRepository for RemoteRepository<DocumentRequest> {
    async fn find_by_tracking(&self, number: &str) -> RecordsResult<Option<DocumentRequest>> {
        let path = format!(
            "documents/track/by-number/{}",
            urlencoding::encode(number.trim())
        );
        match self.client.get_json::<Option<DocumentRequest>>(&path).await {
            Ok(found) => Ok(found),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
