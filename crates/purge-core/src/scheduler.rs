use purge_sources::DownloadService;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cleanup::{CleanupReport, CleanupTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleOptions {
    /// Pause between the end of one run and the start of the next
    pub interval: Duration,
    pub run_on_startup: bool,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600),
            run_on_startup: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchedulerSummary {
    pub runs: usize,
    pub last_report: Option<CleanupReport>,
}

/// Runs the cleanup task on a fixed cadence until cancelled.
///
/// Runs never overlap: the wait starts once a run has finished, and a run
/// that has started always completes. Cancellation is observed while
/// waiting and before each run.
pub struct Scheduler<S> {
    task: CleanupTask<S>,
    options: ScheduleOptions,
}

impl<S: DownloadService> Scheduler<S> {
    pub fn new(task: CleanupTask<S>, options: ScheduleOptions) -> Self {
        Self { task, options }
    }

    pub async fn run(&self, token: CancellationToken) -> SchedulerSummary {
        let mut summary = SchedulerSummary::default();

        info!(
            operation = "scheduler_started",
            interval_secs = self.options.interval.as_secs(),
            run_on_startup = self.options.run_on_startup,
            "Scheduler started"
        );

        if self.options.run_on_startup && !token.is_cancelled() {
            info!(operation = "scheduler_startup", "Running initial cleanup on startup");
            self.run_task(&mut summary).await;
        }

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(self.options.interval) => {}
            }

            if token.is_cancelled() {
                break;
            }

            info!(operation = "scheduled_cleanup_start", "Starting scheduled cleanup");
            self.run_task(&mut summary).await;
        }

        info!(
            operation = "scheduler_stopped",
            runs = summary.runs,
            "Scheduler stopped"
        );
        summary
    }

    async fn run_task(&self, summary: &mut SchedulerSummary) {
        let report = self.task.run_once().await;
        summary.runs += 1;
        summary.last_report = Some(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Thresholds;
    use async_trait::async_trait;
    use purge_models::{Category, ItemId};
    use purge_sources::{ClientError, DeleteOutcome, Page};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    /// Each run makes exactly one list call, which takes `work` to answer
    struct SlowService {
        work: Duration,
        spans: Arc<Mutex<Vec<(Instant, Instant)>>>,
    }

    #[async_trait]
    impl DownloadService for SlowService {
        fn service_name(&self) -> &str {
            "slow"
        }

        async fn list_page(
            &self,
            _category: Category,
            _offset: usize,
            _limit: usize,
        ) -> Result<Page, ClientError> {
            let start = Instant::now();
            tokio::time::sleep(self.work).await;
            self.spans.lock().unwrap().push((start, Instant::now()));
            Ok(Page::default())
        }

        async fn delete_item(&self, _id: &ItemId, _category: Category) -> DeleteOutcome {
            DeleteOutcome::Deleted { body: String::new() }
        }
    }

    fn scheduler(work: Duration, options: ScheduleOptions) -> (Scheduler<SlowService>, Arc<Mutex<Vec<(Instant, Instant)>>>) {
        let spans = Arc::new(Mutex::new(Vec::new()));
        let service = SlowService {
            work,
            spans: spans.clone(),
        };
        let task = CleanupTask::new(service, vec![Category::Torrent], Thresholds::from_secs(7200, 86400));
        (Scheduler::new(task, options), spans)
    }

    fn cancel_after(token: &CancellationToken, after: Duration) {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            token.cancel();
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_are_serialized_and_spaced() {
        let options = ScheduleOptions {
            interval: Duration::from_secs(10),
            run_on_startup: true,
        };
        let (scheduler, spans) = scheduler(Duration::from_secs(5), options);
        let token = CancellationToken::new();
        let origin = Instant::now();

        // Cancelled while the third run (t=30..35) is in flight
        cancel_after(&token, Duration::from_secs(33));
        let summary = scheduler.run(token).await;

        assert_eq!(summary.runs, 3);
        let spans = spans.lock().unwrap();
        let starts: Vec<u64> = spans.iter().map(|(s, _)| (*s - origin).as_secs()).collect();
        assert_eq!(starts, vec![0, 15, 30]);
        for pair in spans.windows(2) {
            assert!(pair[1].0 >= pair[0].1, "runs overlapped");
        }
        // The in-flight run finished before the loop returned
        assert_eq!((spans[2].1 - origin).as_secs(), 35);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_run_delays_next_run() {
        let options = ScheduleOptions {
            interval: Duration::from_secs(10),
            run_on_startup: true,
        };
        let (scheduler, spans) = scheduler(Duration::from_secs(25), options);
        let token = CancellationToken::new();
        let origin = Instant::now();

        cancel_after(&token, Duration::from_secs(50));
        let summary = scheduler.run(token).await;

        assert_eq!(summary.runs, 2);
        let starts: Vec<u64> = spans
            .lock()
            .unwrap()
            .iter()
            .map(|(s, _)| (*s - origin).as_secs())
            .collect();
        assert_eq!(starts, vec![0, 35]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_runs_nothing() {
        let (scheduler, spans) = scheduler(Duration::from_secs(1), ScheduleOptions::default());
        let token = CancellationToken::new();
        token.cancel();

        let summary = scheduler.run(token).await;

        assert_eq!(summary.runs, 0);
        assert!(summary.last_report.is_none());
        assert!(spans.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_startup_run_waits_one_interval() {
        let options = ScheduleOptions {
            interval: Duration::from_secs(10),
            run_on_startup: false,
        };
        let (scheduler, spans) = scheduler(Duration::from_secs(1), options);
        let token = CancellationToken::new();
        let origin = Instant::now();

        cancel_after(&token, Duration::from_secs(15));
        let summary = scheduler.run(token).await;

        assert_eq!(summary.runs, 1);
        let starts: Vec<u64> = spans
            .lock()
            .unwrap()
            .iter()
            .map(|(s, _)| (*s - origin).as_secs())
            .collect();
        assert_eq!(starts, vec![10]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_honoured_mid_wait() {
        let options = ScheduleOptions {
            interval: Duration::from_secs(3600),
            run_on_startup: true,
        };
        let (scheduler, _spans) = scheduler(Duration::from_secs(1), options);
        let token = CancellationToken::new();
        let origin = Instant::now();

        cancel_after(&token, Duration::from_secs(5));
        let summary = scheduler.run(token).await;

        assert_eq!(summary.runs, 1);
        assert!(summary.last_report.is_some());
        assert_eq!((Instant::now() - origin).as_secs(), 5);
    }
}
