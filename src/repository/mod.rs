//! Record repositories
//!
//! One contract, [`Repository`], over both record kinds, with three
//! implementations:
//!
//! - [`RemoteRepository`]: the REST backend via [`RecordsClient`](crate::client::RecordsClient)
//! - [`LocalRepository`]: JSON collections in an injected [`KeyValueStore`](crate::store::KeyValueStore)
//! - [`FallbackRepository`]: remote and local combined under an explicit
//!   [`FallbackPolicy`] for reads and another for writes
//!
//! Records created locally keep local identifiers and local tracking numbers.
//! Nothing ever reconciles them with the backend: an offline record stays
//! invisible to remote-backed lists and to other devices.

mod fallback;
mod local;
mod remote;

pub use fallback::FallbackRepository;
pub use local::LocalRepository;
pub use remote::RemoteRepository;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RecordsResult;
use crate::model::{DocumentRequest, IncidentReport, Record};

/// Where a record was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Accepted by the backend; identifiers are authoritative
    Remote,
    /// Written to the local store only
    Local,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Remote => write!(f, "remote"),
            Origin::Local => write!(f, "local"),
        }
    }
}

/// A freshly created record and where it lives
#[derive(Debug, Clone, PartialEq)]
pub struct Created<R> {
    pub record: R,
    pub origin: Origin,
}

/// Which store an operation goes to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Backend only; failures surface to the caller
    RemoteOnly,
    /// Local store only
    LocalOnly,
    /// Backend first, local store when the backend fails
    #[default]
    PreferRemote,
}

impl std::str::FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "remote_only" => Ok(FallbackPolicy::RemoteOnly),
            "local_only" => Ok(FallbackPolicy::LocalOnly),
            "prefer_remote" => Ok(FallbackPolicy::PreferRemote),
            other => Err(format!("Unknown fallback policy: {}", other)),
        }
    }
}

/// CRUD over one record kind
#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    /// Short name of the backing store, for logs and CLI output
    fn source(&self) -> &'static str;

    /// Every record, verbatim
    async fn list(&self) -> RecordsResult<Vec<R>>;

    /// One record; a missing id is [`RecordsError::NotFound`](crate::error::RecordsError::NotFound)
    async fn get(&self, id: &str) -> RecordsResult<R>;

    /// Create a record from a draft
    async fn create(&self, draft: R::Draft) -> RecordsResult<Created<R>>;

    /// Apply a partial update
    async fn update(&self, id: &str, patch: &R::Patch) -> RecordsResult<()>;

    /// Delete a record
    async fn delete(&self, id: &str) -> RecordsResult<()>;
}

/// Incident report reads beyond plain CRUD
#[async_trait]
pub trait ReportRepository: Repository<IncidentReport> {
    /// Reports not yet reviewed
    async fn list_pending(&self) -> RecordsResult<Vec<IncidentReport>>;

    /// Staff view of one report, including reporter name and contact
    async fn get_detailed(&self, id: &str) -> RecordsResult<IncidentReport>;
}

/// Document request reads beyond plain CRUD
#[async_trait]
pub trait DocumentRepository: Repository<DocumentRequest> {
    /// Look a request up by its public tracking number
    async fn find_by_tracking(&self, number: &str) -> RecordsResult<Option<DocumentRequest>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "prefer-remote".parse::<FallbackPolicy>().unwrap(),
            FallbackPolicy::PreferRemote
        );
        assert_eq!(
            "REMOTE_ONLY".parse::<FallbackPolicy>().unwrap(),
            FallbackPolicy::RemoteOnly
        );
        assert!("sometimes".parse::<FallbackPolicy>().is_err());
    }

    #[test]
    fn test_policy_toml_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: FallbackPolicy,
        }
        let w: Wrapper = toml::from_str(r#"policy = "local_only""#).unwrap();
        assert_eq!(w.policy, FallbackPolicy::LocalOnly);
    }
}
