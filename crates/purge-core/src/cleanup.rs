use chrono::Utc;
use purge_models::Category;
use purge_sources::{DeleteOutcome, DownloadService};
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

use crate::classify::{classify, Classification, Thresholds};

/// Fetch, classify and delete, once per call.
///
/// Every failure inside a run is logged and skipped; nothing is returned
/// to the caller except the report.
pub struct CleanupTask<S> {
    service: S,
    categories: Vec<Category>,
    thresholds: Thresholds,
    page_size: usize,
    dry_run: bool,
}

/// Result of fetching and classifying without deleting
#[derive(Debug, Clone, Default)]
pub struct Scan {
    pub fetched: usize,
    pub fetch_errors: usize,
    pub classification: Classification,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanupReport {
    pub fetched: usize,
    pub selected: usize,
    pub deleted: usize,
    pub failed: usize,
    pub unparseable: usize,
    pub fetch_errors: usize,
    pub dry_run: bool,
    pub duration: Duration,
}

impl<S: DownloadService> CleanupTask<S> {
    pub fn new(service: S, categories: Vec<Category>, thresholds: Thresholds) -> Self {
        Self {
            service,
            categories,
            thresholds,
            page_size: 1000,
            dry_run: false,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Classify and log, but never send delete requests
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[cfg(test)]
    fn service(&self) -> &S {
        &self.service
    }

    /// Fetch every configured category, in order, and classify the combined set
    pub async fn scan(&self) -> Scan {
        let mut items = Vec::new();
        let mut fetch_errors = 0;

        for &category in &self.categories {
            let outcome = self.service.list_items(category, self.page_size).await;
            if outcome.is_complete() {
                info!(
                    operation = "fetch_category",
                    category = %category,
                    count = outcome.items.len(),
                    "Fetched items"
                );
            } else if let Some(e) = &outcome.error {
                fetch_errors += 1;
                error!(
                    operation = "fetch_category_error",
                    category = %category,
                    count = outcome.items.len(),
                    transient = e.is_transient(),
                    error = %e,
                    "Fetch ended early, continuing with partial list"
                );
            }
            items.extend(outcome.items);
        }

        let fetched = items.len();
        let classification = classify(items, &self.thresholds, Utc::now());

        Scan {
            fetched,
            fetch_errors,
            classification,
        }
    }

    #[instrument(skip(self), fields(service = self.service.service_name()))]
    pub async fn run_once(&self) -> CleanupReport {
        let start = Instant::now();
        let categories: Vec<&str> = self.categories.iter().map(|c| c.as_str()).collect();
        info!(
            operation = "cleanup_start",
            categories = ?categories,
            dry_run = self.dry_run,
            started_at = %Utc::now().to_rfc3339(),
            "Running cleanup task"
        );

        let scan = self.scan().await;
        let flagged = &scan.classification.flagged;
        let ids: Vec<String> = flagged.iter().map(|f| f.item.id.to_string()).collect();
        info!(
            operation = "cleanup_selected",
            fetched = scan.fetched,
            selected = flagged.len(),
            unparseable = scan.classification.unparseable,
            ids = %ids.join(", "),
            "Stalled items"
        );

        let mut report = CleanupReport {
            fetched: scan.fetched,
            selected: flagged.len(),
            unparseable: scan.classification.unparseable,
            fetch_errors: scan.fetch_errors,
            dry_run: self.dry_run,
            ..CleanupReport::default()
        };

        for entry in flagged {
            let item = &entry.item;
            if self.dry_run {
                info!(
                    operation = "delete_skipped",
                    id = %item.id,
                    category = %item.category,
                    reason = ?entry.reason,
                    age_secs = entry.age_seconds(),
                    "Dry run, not deleting {}",
                    item.label()
                );
                continue;
            }

            match self.service.delete_item(&item.id, item.category).await {
                DeleteOutcome::Deleted { body } => {
                    report.deleted += 1;
                    info!(
                        operation = "delete_item",
                        id = %item.id,
                        category = %item.category,
                        reason = ?entry.reason,
                        age_secs = entry.age_seconds(),
                        response = %body,
                        "Deleted {}",
                        item.label()
                    );
                }
                DeleteOutcome::Failed { reason } => {
                    report.failed += 1;
                    warn!(
                        operation = "delete_item_error",
                        id = %item.id,
                        category = %item.category,
                        error = %reason,
                        "Failed to delete {}",
                        item.label()
                    );
                }
            }
        }

        report.duration = start.elapsed();
        info!(
            operation = "cleanup_complete",
            fetched = report.fetched,
            selected = report.selected,
            deleted = report.deleted,
            failed = report.failed,
            fetch_errors = report.fetch_errors,
            duration_ms = report.duration.as_millis() as u64,
            "Cleanup task finished"
        );
        report
    }
}
