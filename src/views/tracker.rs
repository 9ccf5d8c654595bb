//! Resident lookup by tracking number

use serde::Serialize;
use std::sync::Arc;

use super::{LoadingFlag, Lookup};
use crate::model::{DocumentRequest, DocumentStatus};
use crate::repository::DocumentRepository;

/// One step of the progress timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineStep {
    pub status: DocumentStatus,
    pub label: &'static str,
    pub completed: bool,
}

const TIMELINE_STEPS: [(DocumentStatus, &str); 4] = [
    (DocumentStatus::Pending, "Pending"),
    (DocumentStatus::Processing, "Processing"),
    (DocumentStatus::ReadyForPickup, "Ready"),
    (DocumentStatus::Issued, "Issued"),
];

/// Progress timeline for a request in `status`.
///
/// Step `i` is complete when `i` does not exceed the status's timeline
/// position. Statuses off the timeline, such as rejected, complete nothing.
pub fn timeline(status: DocumentStatus) -> Vec<TimelineStep> {
    let reached = status.timeline_index();
    TIMELINE_STEPS
        .iter()
        .enumerate()
        .map(|(i, &(step, label))| TimelineStep {
            status: step,
            label,
            completed: reached.map_or(false, |idx| i <= idx),
        })
        .collect()
}

/// Controller for the "track my request" screen
pub struct RequestTracker {
    repo: Arc<dyn DocumentRepository>,
    loading: LoadingFlag,
    query: String,
    result: Option<Lookup<DocumentRequest>>,
    error: Option<String>,
}

impl RequestTracker {
    pub fn new(repo: Arc<dyn DocumentRepository>) -> Self {
        Self {
            repo,
            loading: LoadingFlag::new(),
            query: String::new(),
            result: None,
            error: None,
        }
    }

    /// Look up a tracking number.
    ///
    /// Blank input is ignored and leaves the previous result in place.
    pub async fn search(&mut self, number: &str) -> Option<&Lookup<DocumentRequest>> {
        let number = number.trim();
        if number.is_empty() {
            return self.result.as_ref();
        }

        let _guard = self.loading.acquire();
        self.query = number.to_string();

        match self.repo.find_by_tracking(number).await {
            Ok(Some(doc)) => {
                self.result = Some(Lookup::Found(doc));
                self.error = None;
            }
            Ok(None) => {
                tracing::debug!(tracking_number = %number, "No request with that tracking number");
                self.result = Some(Lookup::NotFound);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(tracking_number = %number, error = %e, "Tracking lookup failed");
                self.result = None;
                self.error = Some(e.user_message());
            }
        }

        self.result.as_ref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn result(&self) -> Option<&Lookup<DocumentRequest>> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_set()
    }

    pub fn loading_flag(&self) -> LoadingFlag {
        self.loading.clone()
    }

    /// Timeline of the found request, if any
    pub fn timeline(&self) -> Option<Vec<TimelineStep>> {
        self.result
            .as_ref()
            .and_then(Lookup::found)
            .map(|doc| timeline(doc.status))
    }

    pub fn reset(&mut self) {
        self.query.clear();
        self.result = None;
        self.error = None;
    }
}
