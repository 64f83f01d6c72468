pub mod classify;
pub mod cleanup;
pub mod scheduler;

pub use classify::{classify, Classification, FlagReason, FlaggedItem, Thresholds};
pub use cleanup::{CleanupReport, CleanupTask, Scan};
pub use scheduler::{ScheduleOptions, Scheduler, SchedulerSummary};
