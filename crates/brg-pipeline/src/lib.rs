//! File ingestion for the brg-ingest pipeline.
//!
//! [`FileProcessor`] ties the parser, catalog, registry and audit log
//! together. It is driven either in batch mode through
//! [`FileProcessor::process_inbox`] or one file at a time by the inbox
//! watcher through [`FileProcessor::process_file`].
//!
//! # Outcomes
//!
//! | Status | File moved to | Catalog | Registry |
//! |--------|---------------|---------|----------|
//! | `success` | `processed/` under its archive name | records merged | hash added |
//! | `skipped_duplicate` | `processed/` with a `_dup` suffix | unchanged | unchanged |
//! | `error` | `error/` with an `__ERROR__<CODE>` marker | unchanged | unchanged |
//!
//! Every outcome appends one line to the audit log.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod processor;
mod stats;

pub use error::ProcessError;
pub use processor::{FileProcessor, ProcessOutcome, UNKNOWN_HASH};
pub use stats::{InboxSummary, ProcessStats, StatsSnapshot};
