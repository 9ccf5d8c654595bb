//! # Barangay Records
//!
//! Client core for a barangay records office: residents request documents,
//! track them by tracking number, and file blotter (incident) reports; staff
//! review, publish, and manage those records.
//!
//! ## Features
//!
//! - **Typed records**: incident reports and document requests with their
//!   status vocabularies and the document catalog
//! - **One repository contract**: remote (REST), local (key-value store), and
//!   a fallback combinator chosen by an explicit policy
//! - **Screen controllers**: load, reconcile, and mutate with a loading guard
//!   that clears on every exit path
//! - **Sandbox backend**: an in-memory Axum server with fault injection
//!
//! ## Modules
//!
//! - [`model`]: Records, drafts, patches, attachments, tracking numbers
//! - [`client`]: REST client
//! - [`store`]: Local key-value store
//! - [`repository`]: Remote, local, and fallback repositories
//! - [`views`]: Screen controllers
//! - [`sandbox`]: In-memory records backend
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use barangay_records::{
//!     ClientConfig, DocumentRequest, DocumentRequestForm, DocumentType, FallbackRepository,
//!     FileStore, KeyValueStore, LocalRepository, RecordsClient, RemoteRepository,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RecordsClient::new(ClientConfig::default())?;
//!     let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open("./records_data")?);
//!
//!     let repo = FallbackRepository::new(
//!         RemoteRepository::<DocumentRequest>::new(client),
//!         LocalRepository::<DocumentRequest>::new(store),
//!     );
//!
//!     let mut form = DocumentRequestForm::new(Arc::new(repo));
//!     form.draft.resident_name = "Juan Dela Cruz".to_string();
//!     form.select_type(DocumentType::Residency);
//!
//!     let submission = form.submit().await?;
//!     println!("Tracking number: {}", submission.tracking_number);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod repository;
pub mod sandbox;
pub mod store;
pub mod views;

// Re-export top-level types for convenience
pub use client::{ClientConfig, RecordsClient};

pub use config::{Config, ConfigError, LoggingConfig};

pub use error::{RecordsError, RecordsResult};

pub use model::{
    Attachment, BarangaySettings, DocumentPatch, DocumentRequest, DocumentStatus, DocumentType,
    IncidentPatch, IncidentReport, IncidentStatus, NewDocumentRequest, NewIncidentReport, Record,
};

pub use repository::{
    Created, DocumentRepository, FallbackPolicy, FallbackRepository, LocalRepository, Origin,
    RemoteRepository, ReportRepository, Repository,
};

pub use store::{FileStore, KeyValueStore, MemoryStore};

pub use views::{
    BulkOutcome, DocumentDesk, DocumentRequestForm, Lookup, ReportForm, ReportLog, ReportReview,
    RequestTracker, SettingsPanel,
};
