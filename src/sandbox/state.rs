//! Sandbox state
//!
//! In-memory record tables plus fault switches, shared by every handler.
//! Clones share the same tables, so tests keep a handle to flip faults while
//! the server runs.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use super::error::{SandboxError, SandboxResult};
use crate::model::{DocumentRequest, IncidentReport};

#[derive(Clone)]
pub struct SandboxState {
    pub reports: Arc<RwLock<Vec<IncidentReport>>>,
    pub documents: Arc<RwLock<Vec<DocumentRequest>>>,
    offline: Arc<AtomicBool>,
    failing: Arc<RwLock<HashSet<String>>>,
    start_time: Instant,
}

impl Default for SandboxState {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxState {
    pub fn new() -> Self {
        Self {
            reports: Arc::new(RwLock::new(Vec::new())),
            documents: Arc::new(RwLock::new(Vec::new())),
            offline: Arc::new(AtomicBool::new(false)),
            failing: Arc::new(RwLock::new(HashSet::new())),
            start_time: Instant::now(),
        }
    }

    /// Answer every request with 503 while set
    pub fn set_offline(&self, offline: bool) {
        tracing::info!(offline, "Sandbox availability changed");
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Answer every request naming `id` with 500
    pub async fn fail_record(&self, id: &str) {
        self.failing.write().await.insert(id.to_string());
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub(crate) fn ensure_online(&self) -> SandboxResult<()> {
        if self.is_offline() {
            return Err(SandboxError::ServiceUnavailable(
                "Sandbox is offline".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) async fn ensure_record_ok(&self, id: &str) -> SandboxResult<()> {
        self.ensure_online()?;
        if self.failing.read().await.contains(id) {
            return Err(SandboxError::Internal(format!(
                "Injected failure for record {}",
                id
            )));
        }
        Ok(())
    }
}

/// Sandbox server configuration
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    pub host: String,
    pub port: u16,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl SandboxConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
