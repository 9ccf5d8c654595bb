//! Shared harness: a live sandbox plus repositories pointed at it
#![allow(dead_code)]

use std::sync::Arc;

use barangay_records::model::{DocumentRequest, IncidentReport};
use barangay_records::repository::{
    DocumentRepository, FallbackRepository, LocalRepository, RemoteRepository, ReportRepository,
};
use barangay_records::sandbox::{self, RunningSandbox, SandboxState};
use barangay_records::store::{KeyValueStore, MemoryStore};
use barangay_records::{ClientConfig, RecordsClient};

pub struct Harness {
    pub state: SandboxState,
    pub sandbox: RunningSandbox,
    pub client: RecordsClient,
    /// The resident's device
    pub store: Arc<dyn KeyValueStore>,
}

impl Harness {
    pub async fn start() -> Self {
        let state = SandboxState::new();
        let sandbox = sandbox::spawn(state.clone()).await.unwrap();
        let client = RecordsClient::new(ClientConfig::new(sandbox.api_url())).unwrap();

        Self {
            state,
            sandbox,
            client,
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub fn staff_reports(&self) -> Arc<dyn ReportRepository> {
        Arc::new(RemoteRepository::<IncidentReport>::new(self.client.clone()))
    }

    pub fn staff_documents(&self) -> Arc<dyn DocumentRepository> {
        Arc::new(RemoteRepository::<DocumentRequest>::new(self.client.clone()))
    }

    /// Default resident wiring: backend first, this device when it fails
    pub fn resident_documents(&self) -> Arc<dyn DocumentRepository> {
        Arc::new(FallbackRepository::new(
            RemoteRepository::<DocumentRequest>::new(self.client.clone()),
            LocalRepository::<DocumentRequest>::new(Arc::clone(&self.store)),
        ))
    }
}
