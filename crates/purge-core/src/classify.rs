use chrono::{DateTime, Duration, Utc};
use purge_models::Item;
use serde::Serialize;
use tracing::warn;

/// Age limits applied by [`classify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Minimum age (inclusive) for an item in a stuck state
    pub stall: Duration,
    /// Age an item still downloading must exceed (exclusive)
    pub eta: Duration,
}

impl Thresholds {
    pub fn from_secs(stall_secs: u64, eta_secs: u64) -> Self {
        Self {
            stall: seconds(stall_secs),
            eta: seconds(eta_secs),
        }
    }
}

// Clamp so absurd configuration values cannot overflow chrono's range
fn seconds(secs: u64) -> Duration {
    const MAX_SECS: u64 = (i64::MAX / 1_000) as u64;
    Duration::seconds(secs.min(MAX_SECS) as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagReason {
    /// Stuck state held past the stall threshold
    Stalled,
    /// Still downloading past the ETA threshold
    Slow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedItem {
    pub item: Item,
    pub age: Duration,
    pub reason: FlagReason,
}

impl FlaggedItem {
    pub fn age_seconds(&self) -> i64 {
        self.age.num_seconds()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Items selected for deletion, in input order
    pub flagged: Vec<FlaggedItem>,
    /// Items skipped because `created_at` could not be parsed
    pub unparseable: usize,
}

/// Select the items that should be deleted.
///
/// Each item is judged on its own against `now`: a stuck state at least
/// `thresholds.stall` old, or `downloading` for longer than
/// `thresholds.eta`. Items with an unreadable creation time are never
/// selected.
pub fn classify(items: Vec<Item>, thresholds: &Thresholds, now: DateTime<Utc>) -> Classification {
    let mut classification = Classification::default();

    for item in items {
        let created = match item.created_at_utc() {
            Ok(created) => created,
            Err(e) => {
                warn!(
                    operation = "parse_created_at_error",
                    id = %item.id,
                    category = %item.category,
                    created_at = %item.created_at,
                    error = %e,
                    "Could not parse created_at, skipping item"
                );
                classification.unparseable += 1;
                continue;
            }
        };

        let age = now - created;
        let reason = if item.state.is_stuck() && age >= thresholds.stall {
            Some(FlagReason::Stalled)
        } else if item.state.is_downloading() && age > thresholds.eta {
            Some(FlagReason::Slow)
        } else {
            None
        };

        if let Some(reason) = reason {
            classification.flagged.push(FlaggedItem { item, age, reason });
        }
    }

    classification
}
