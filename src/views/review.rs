//! Staff review of incident reports

use std::sync::Arc;

use super::{nothing_selected, BulkOutcome, LoadingFlag, Lookup, Selection};
use crate::error::RecordsResult;
use crate::model::{IncidentPatch, IncidentReport, IncidentStatus};
use crate::repository::{ReportRepository, Repository};

/// Title filter per tab, plus the status filter of the "all" tab
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilters {
    pub pending_title: String,
    pub published_title: String,
    pub all_title: String,
    /// `None` shows every status
    pub status: Option<IncidentStatus>,
}

/// Tab badge counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewCounts {
    pub pending: usize,
    pub published: usize,
    pub total: usize,
}

/// Controller for the report review screen.
///
/// Holds the pending list and the full list, loaded together. The published
/// tab is derived from the full list.
pub struct ReportReview {
    repo: Arc<dyn ReportRepository>,
    pending: Vec<IncidentReport>,
    all: Vec<IncidentReport>,
    loading: LoadingFlag,
    error: Option<String>,
    selection: Selection,
    pub filters: ReviewFilters,
}

impl ReportReview {
    pub fn new(repo: Arc<dyn ReportRepository>) -> Self {
        Self {
            repo,
            pending: Vec::new(),
            all: Vec::new(),
            loading: LoadingFlag::new(),
            error: None,
            selection: Selection::default(),
            filters: ReviewFilters::default(),
        }
    }

    /// Fetch pending and all reports concurrently.
    ///
    /// Either failure empties both lists and sets the error.
    pub async fn load(&mut self) -> bool {
        let _guard = self.loading.acquire();
        let fetched = tokio::try_join!(self.repo.list_pending(), self.repo.list());

        match fetched {
            Ok((pending, all)) => {
                tracing::debug!(pending = pending.len(), total = all.len(), "Loaded reports");
                self.pending = pending;
                self.all = all;
                self.error = None;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load reports");
                self.pending.clear();
                self.all.clear();
                self.error = Some(e.user_message());
                false
            }
        }
    }

    pub fn pending(&self) -> &[IncidentReport] {
        &self.pending
    }

    pub fn all(&self) -> &[IncidentReport] {
        &self.all
    }

    pub fn published(&self) -> Vec<&IncidentReport> {
        self.all
            .iter()
            .filter(|r| r.status == IncidentStatus::Published)
            .collect()
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

    pub fn counts(&self) -> ReviewCounts {
        ReviewCounts {
            pending: self.pending.len(),
            published: self.published().len(),
            total: self.all.len(),
        }
    }

    pub fn filtered_pending(&self) -> Vec<&IncidentReport> {
        self.pending
            .iter()
            .filter(|r| r.title_matches(&self.filters.pending_title))
            .collect()
    }

    pub fn filtered_published(&self) -> Vec<&IncidentReport> {
        self.published()
            .into_iter()
            .filter(|r| r.title_matches(&self.filters.published_title))
            .collect()
    }

    pub fn filtered_all(&self) -> Vec<&IncidentReport> {
        self.all
            .iter()
            .filter(|r| r.title_matches(&self.filters.all_title))
            .filter(|r| self.filters.status.map_or(true, |s| r.status == s))
            .collect()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn toggle_selected(&mut self, id: &str) {
        self.selection.toggle(id);
    }

    /// Select every loaded pending report, in list order
    pub fn select_all_pending(&mut self) {
        let ids: Vec<&str> = self.pending.iter().map(|r| r.id.as_str()).collect();
        self.selection.select_all(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Staff view of one report, reporter details included
    pub async fn view_detail(&self, id: &str) -> RecordsResult<Lookup<IncidentReport>> {
        Lookup::from_result(self.repo.get_detailed(id).await)
    }

    pub async fn publish(&mut self, id: &str, show_reporter: bool) -> RecordsResult<()> {
        self.mutate(id, IncidentPatch::publish(show_reporter)).await
    }

    pub async fn reject(&mut self, id: &str) -> RecordsResult<()> {
        self.mutate(id, IncidentPatch::status(IncidentStatus::Rejected))
            .await
    }

    pub async fn change_status(&mut self, id: &str, status: IncidentStatus) -> RecordsResult<()> {
        self.mutate(id, IncidentPatch::status(status)).await
    }

    pub async fn set_visibility(&mut self, id: &str, show_reporter: bool) -> RecordsResult<()> {
        self.mutate(id, IncidentPatch::visibility(show_reporter))
            .await
    }

    pub async fn delete(&mut self, id: &str) -> RecordsResult<()> {
        match self.repo.delete(id).await {
            Ok(()) => {
                self.selection.remove(id);
                self.load().await;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    async fn mutate(&mut self, id: &str, patch: IncidentPatch) -> RecordsResult<()> {
        match self.repo.update(id, &patch).await {
            Ok(()) => {
                self.selection.remove(id);
                self.load().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Report update failed");
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Publish every selected report, one request at a time.
    ///
    /// Failures are recorded and skipped. The lists are refreshed and the
    /// selection cleared afterwards.
    pub async fn bulk_publish(&mut self, show_reporter: bool) -> RecordsResult<BulkOutcome> {
        if self.selection.is_empty() {
            return Err(nothing_selected());
        }
        let patch = IncidentPatch::publish(show_reporter);
        let mut outcome = BulkOutcome::default();

        for id in self.selection.ids().to_vec() {
            match self.repo.update(&id, &patch).await {
                Ok(()) => outcome.succeeded.push(id),
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "Failed to publish report");
                    outcome.failed.push((id, e.user_message()));
                }
            }
        }

        self.finish_bulk("publish", &outcome).await;
        Ok(outcome)
    }

    /// Delete every selected report, one request at a time
    pub async fn bulk_delete(&mut self) -> RecordsResult<BulkOutcome> {
        if self.selection.is_empty() {
            return Err(nothing_selected());
        }
        let mut outcome = BulkOutcome::default();

        for id in self.selection.ids().to_vec() {
            match self.repo.delete(&id).await {
                Ok(()) => outcome.succeeded.push(id),
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "Failed to delete report");
                    outcome.failed.push((id, e.user_message()));
                }
            }
        }

        self.finish_bulk("delete", &outcome).await;
        Ok(outcome)
    }

    async fn finish_bulk(&mut self, action: &str, outcome: &BulkOutcome) {
        tracing::info!(
            action = action,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Bulk action finished"
        );
        self.load().await;
        self.selection.clear();
    }
}
