//! Screen controllers
//!
//! Each screen of the records system is a small controller that owns its view
//! state: collections, filters, selection, a loading flag, and an error
//! message. Every controller follows the same lifecycle:
//!
//! 1. Raise the loading flag through a [`LoadingGuard`]
//! 2. Call the repository
//! 3. On success, replace the collection verbatim; on failure, empty it and
//!    set a user-facing error. Stale data is never kept.
//! 4. Drop the guard, which clears the flag on every exit path
//!
//! Mutations never patch local state; they re-read the affected collections.
//!
//! ## Screens
//!
//! - [`ReportReview`]: staff review of incident reports
//! - [`DocumentDesk`]: staff list of document requests
//! - [`DocumentRequestForm`]: resident document request
//! - [`RequestTracker`]: resident lookup by tracking number
//! - [`ReportForm`]: resident incident report
//! - [`ReportLog`]: local-only blotter log
//! - [`SettingsPanel`]: barangay settings

mod desk;
mod report_form;
mod report_log;
mod request_form;
mod review;
mod settings;
mod tracker;

#[cfg(test)]
pub(crate) mod testing;

pub use desk::{DocumentDesk, DocumentEdit, DocumentFilters};
pub use report_form::ReportForm;
pub use report_log::{LogEntryForm, ReportLog, INCIDENT_TYPES};
pub use request_form::{DocumentRequestForm, Submission};
pub use review::{ReportReview, ReviewCounts, ReviewFilters};
pub use settings::SettingsPanel;
pub use tracker::{timeline, RequestTracker, TimelineStep};

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{RecordsError, RecordsResult};

/// Shared "request in flight" indicator.
///
/// Clones observe the same flag, so a renderer can watch it while the owning
/// controller is busy awaiting.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raise the flag until the returned guard is dropped
    pub fn acquire(&self) -> LoadingGuard {
        self.0.store(true, Ordering::SeqCst);
        LoadingGuard(Arc::clone(&self.0))
    }
}

/// Clears the loading flag when dropped, including during unwinding
#[must_use = "the loading flag is cleared as soon as the guard is dropped"]
#[derive(Debug)]
pub struct LoadingGuard(Arc<AtomicBool>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A collection shown on screen, with its loading flag and error banner
#[derive(Debug)]
pub struct CollectionState<T> {
    items: Vec<T>,
    error: Option<String>,
    loading: LoadingFlag,
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            error: None,
            loading: LoadingFlag::new(),
        }
    }
}

impl<T> CollectionState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_set()
    }

    /// Handle for observing the loading flag from outside
    pub fn loading_flag(&self) -> LoadingFlag {
        self.loading.clone()
    }

    /// Run a fetch under the loading flag and reconcile its result.
    ///
    /// Returns whether the fetch succeeded.
    pub async fn load<F>(&mut self, fetch: F) -> bool
    where
        F: Future<Output = RecordsResult<Vec<T>>>,
    {
        let _guard = self.loading.acquire();
        let result = fetch.await;
        self.reconcile(result)
    }

    /// Replace the collection on success; empty it and set the error on failure
    pub fn reconcile(&mut self, result: RecordsResult<Vec<T>>) -> bool {
        match result {
            Ok(items) => {
                self.items = items;
                self.error = None;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load collection");
                self.items.clear();
                self.error = Some(e.user_message());
                false
            }
        }
    }

    /// Show an error without touching the collection
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }
}

/// Result of a detail lookup; a missing record is an empty state, not an error
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    /// Fold a "not found" error into [`Lookup::NotFound`]
    pub fn from_result(result: RecordsResult<T>) -> RecordsResult<Self> {
        match result {
            Ok(value) => Ok(Lookup::Found(value)),
            Err(e) if e.is_not_found() => Ok(Lookup::NotFound),
            Err(e) => Err(e),
        }
    }

    pub fn found(&self) -> Option<&T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// Ids selected for a bulk action, in the order they were selected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    /// Add the id if absent, remove it if present
    pub fn toggle(&mut self, id: &str) {
        if let Some(pos) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id.to_string());
        }
    }

    /// Replace the selection with the given ids, deduplicated
    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.ids.clear();
        for id in ids {
            if !self.contains(id) {
                self.ids.push(id.to_string());
            }
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.ids.retain(|s| s != id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Per-item results of a best-effort bulk action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkOutcome {
    pub succeeded: Vec<String>,
    /// Failed ids with the error shown for each
    pub failed: Vec<(String, String)>,
}

impl BulkOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

pub(crate) fn nothing_selected() -> RecordsError {
    RecordsError::Validation("No records selected".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_clears_flag() {
        let flag = LoadingFlag::new();
        {
            let _guard = flag.acquire();
            assert!(flag.is_set());
        }
        assert!(!flag.is_set());
    }

    #[tokio::test]
    async fn test_guard_clears_flag_on_panic() {
        let flag = LoadingFlag::new();
        let observer = flag.clone();

        let handle = tokio::spawn(async move {
            let _guard = flag.acquire();
            panic!("request handler blew up");
        });

        assert!(handle.await.is_err());
        assert!(!observer.is_set());
    }

    #[tokio::test]
    async fn test_load_failure_empties_collection() {
        let mut state = CollectionState::new();
        assert!(state.load(async { Ok(vec![1, 2, 3]) }).await);
        assert_eq!(state.items(), &[1, 2, 3]);

        let ok = state
            .load(async { Err::<Vec<i32>, _>(RecordsError::Unavailable) })
            .await;
        assert!(!ok);
        assert!(state.items().is_empty());
        assert!(!state.error().unwrap_or_default().is_empty());
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_flag_raised_during_fetch() {
        let mut state: CollectionState<i32> = CollectionState::new();
        let observer = state.loading_flag();

        state
            .load(async move {
                assert!(observer.is_set());
                Ok(vec![])
            })
            .await;
        assert!(!state.is_loading());
    }

    #[test]
    fn test_selection_keeps_order() {
        let mut sel = Selection::default();
        sel.toggle("b");
        sel.toggle("a");
        sel.toggle("c");
        sel.toggle("a");
        assert_eq!(sel.ids(), &["b".to_string(), "c".to_string()]);

        sel.select_all(["x", "y", "x"]);
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn test_lookup_from_result() {
        let found = Lookup::from_result(Ok::<_, RecordsError>(5)).unwrap();
        assert_eq!(found.found(), Some(&5));

        let missing = Lookup::<i32>::from_result(Err(RecordsError::NotFound("x".into()))).unwrap();
        assert!(!missing.is_found());

        assert!(Lookup::<i32>::from_result(Err(RecordsError::Timeout)).is_err());
    }
}
