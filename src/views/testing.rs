//! In-process repository with injectable faults, for controller tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::LoadingFlag;
use crate::error::{RecordsError, RecordsResult};
use crate::model::{DocumentRequest, IncidentReport, Record};
use crate::repository::{
    Created, DocumentRepository, LocalRepository, ReportRepository, Repository,
};
use crate::store::{KeyValueStore, MemoryStore};

pub(crate) struct FaultyRepository<R> {
    inner: LocalRepository<R>,
    offline: AtomicBool,
    failing: Mutex<HashSet<String>>,
    failing_ops: Mutex<HashSet<&'static str>>,
    watched: Mutex<Option<LoadingFlag>>,
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) flag_seen: Mutex<Vec<bool>>,
}

impl<R: Record> FaultyRepository<R> {
    pub(crate) fn new() -> Arc<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        Arc::new(Self {
            inner: LocalRepository::new(store),
            offline: AtomicBool::new(false),
            failing: Mutex::new(HashSet::new()),
            failing_ops: Mutex::new(HashSet::new()),
            watched: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            flag_seen: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn fail_record(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    /// Make every call of one operation (`"list"`, `"list_pending"`, ...) fail
    pub(crate) fn fail_op(&self, op: &'static str) {
        self.failing_ops.lock().unwrap().insert(op);
    }

    /// Record the state of `flag` on every call
    pub(crate) fn watch(&self, flag: LoadingFlag) {
        *self.watched.lock().unwrap() = Some(flag);
    }

    pub(crate) async fn seed(&self, draft: R::Draft) -> R {
        self.inner.create(draft).await.unwrap().record
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn check(&self, op: &'static str, id: Option<&str>) -> RecordsResult<()> {
        self.calls.lock().unwrap().push(match id {
            Some(id) => format!("{}:{}", op, id),
            None => op.to_string(),
        });
        if let Some(flag) = self.watched.lock().unwrap().as_ref() {
            self.flag_seen.lock().unwrap().push(flag.is_set());
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(RecordsError::Unavailable);
        }
        if self.failing_ops.lock().unwrap().contains(op) {
            return Err(RecordsError::Api {
                status: 500,
                message: format!("Injected failure for {}", op),
            });
        }
        if let Some(id) = id {
            if self.failing.lock().unwrap().contains(id) {
                return Err(RecordsError::Api {
                    status: 500,
                    message: format!("Injected failure for {}", id),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Record> Repository<R> for FaultyRepository<R> {
    fn source(&self) -> &'static str {
        "faulty"
    }

    async fn list(&self) -> RecordsResult<Vec<R>> {
        self.check("list", None)?;
        self.inner.list().await
    }

    async fn get(&self, id: &str) -> RecordsResult<R> {
        self.check("get", Some(id))?;
        self.inner.get(id).await
    }

    async fn create(&self, draft: R::Draft) -> RecordsResult<Created<R>> {
        self.check("create", None)?;
        self.inner.create(draft).await
    }

    async fn update(&self, id: &str, patch: &R::Patch) -> RecordsResult<()> {
        self.check("update", Some(id))?;
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &str) -> RecordsResult<()> {
        self.check("delete", Some(id))?;
        self.inner.delete(id).await
    }
}

#[async_trait]
impl ReportRepository for FaultyRepository<IncidentReport> {
    async fn list_pending(&self) -> RecordsResult<Vec<IncidentReport>> {
        self.check("list_pending", None)?;
        self.inner.list_pending().await
    }

    async fn get_detailed(&self, id: &str) -> RecordsResult<IncidentReport> {
        self.check("get_detailed", Some(id))?;
        self.inner.get_detailed(id).await
    }
}

#[async_trait]
impl DocumentRepository for FaultyRepository<DocumentRequest> {
    async fn find_by_tracking(&self, number: &str) -> RecordsResult<Option<DocumentRequest>> {
        self.check("find_by_tracking", None)?;
        self.inner.find_by_tracking(number).await
    }
}
