//! Processing statistics with atomic counters.
//!
//! This module provides [`ProcessStats`] for counting file outcomes and
//! [`StatsSnapshot`] for point-in-time views of them.
//!
//! # Thread Safety
//!
//! All counters use [`AtomicU64`] with [`Relaxed`](std::sync::atomic::Ordering::Relaxed)
//! ordering. The counts are informational and need no ordering guarantees.
//!
//! # Examples
//!
//! ```
//! use brg_pipeline::ProcessStats;
//!
//! let stats = ProcessStats::new();
//! let snapshot = stats.snapshot();
//! assert_eq!(snapshot.processed, 0);
//! assert!(!snapshot.has_failures());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use brg_core::ProcessStatus;
use serde::{Deserialize, Serialize};

use crate::processor::ProcessOutcome;

/// Atomic counters for file outcomes.
#[derive(Debug, Default)]
pub struct ProcessStats {
    /// Files attempted.
    processed: AtomicU64,
    /// Files merged into the catalog.
    succeeded: AtomicU64,
    /// Files skipped as already ingested.
    duplicates: AtomicU64,
    /// Files moved to the error directory.
    failed: AtomicU64,
    /// Records added to the catalog.
    rows_added: AtomicU64,
    /// Records added despite a dimension conflict.
    conflicts: AtomicU64,
}

impl ProcessStats {
    /// Creates a new [`ProcessStats`] with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one finished file.
    pub fn record(&self, outcome: &ProcessOutcome) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome.status {
            ProcessStatus::Success => &self.succeeded,
            ProcessStatus::SkippedDuplicate => &self.duplicates,
            ProcessStatus::Error => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.rows_added
            .fetch_add(outcome.n_added as u64, Ordering::Relaxed);
        self.conflicts
            .fetch_add(outcome.n_conflicts as u64, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            rows_added: self.rows_added.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
        }
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        for counter in [
            &self.processed,
            &self.succeeded,
            &self.duplicates,
            &self.failed,
            &self.rows_added,
            &self.conflicts,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// A point-in-time copy of [`ProcessStats`].
///
/// # Examples
///
/// ```
/// use brg_pipeline::StatsSnapshot;
///
/// let snap = StatsSnapshot {
///     processed: 3,
///     succeeded: 1,
///     duplicates: 1,
///     failed: 1,
///     rows_added: 2,
///     conflicts: 0,
/// };
/// assert!(snap.has_failures());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Files attempted.
    pub processed: u64,
    /// Files merged into the catalog.
    pub succeeded: u64,
    /// Files skipped as already ingested.
    pub duplicates: u64,
    /// Files moved to the error directory.
    pub failed: u64,
    /// Records added to the catalog.
    pub rows_added: u64,
    /// Records added despite a dimension conflict.
    pub conflicts: u64,
}

impl StatsSnapshot {
    /// Returns `true` if any file ended in the error directory.
    #[inline]
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Totals for one [`process_inbox`](crate::FileProcessor::process_inbox) pass.
pub type InboxSummary = StatsSnapshot;

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: ProcessStatus, n_added: usize, n_conflicts: usize) -> ProcessOutcome {
        ProcessOutcome {
            status,
            n_added,
            n_conflicts,
            ..ProcessOutcome::default()
        }
    }

    #[test]
    fn test_record_outcomes() {
        let stats = ProcessStats::new();
        stats.record(&outcome(ProcessStatus::Success, 3, 1));
        stats.record(&outcome(ProcessStatus::SkippedDuplicate, 0, 0));
        stats.record(&outcome(ProcessStatus::Error, 0, 0));

        let snap = stats.snapshot();
        assert_eq!(
            snap,
            StatsSnapshot {
                processed: 3,
                succeeded: 1,
                duplicates: 1,
                failed: 1,
                rows_added: 3,
                conflicts: 1,
            }
        );
        assert!(snap.has_failures());
    }

    #[test]
    fn test_reset() {
        let stats = ProcessStats::new();
        stats.record(&outcome(ProcessStatus::Success, 1, 0));
        stats.reset();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_snapshot_serializes() {
        let stats = ProcessStats::new();
        stats.record(&outcome(ProcessStatus::Success, 2, 1));
        insta::assert_json_snapshot!(stats.snapshot(), @r#"
        {
          "processed": 1,
          "succeeded": 1,
          "duplicates": 0,
          "failed": 0,
          "rows_added": 2,
          "conflicts": 1
        }
        "#);
    }
}
