//! Inbox watching for the brg-ingest pipeline.
//!
//! This crate surfaces new supplier files dropped into the inbox directory
//! and hands them, one at a time, to a [`FileHandler`].
//!
//! # Overview
//!
//! - Two backends chosen at construction: OS notifications via `notify`
//!   ([`WatchMode::Events`](brg_core::WatchMode::Events)) or periodic
//!   listing ([`WatchMode::Poll`](brg_core::WatchMode::Poll)). A failing
//!   notification backend degrades to polling with a warning.
//! - A startup drain so files dropped while the service was down are not
//!   missed.
//! - Per-session gating: each absolute path is handled at most once, hidden
//!   and temporary files are ignored, a settle delay precedes the handler
//!   and files that vanished meanwhile are skipped.
//! - Cooperative shutdown through [`StopHandle`], observed within one loop
//!   iteration and never in the middle of a file.
//!
//! # Crate Dependencies
//!
//! ```text
//! brg-cli ──► brg-pipeline ──► brg-catalog ──► brg-parser ──► brg-core
//!         └─► brg-watcher ────────────────────────────────────►
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod events;
mod filter;
mod watcher;

pub use error::WatchError;
pub use events::{ArrivalKind, FileEvent};
pub use filter::{AcceptAllFilter, FileFilter, InboxFilter};
pub use watcher::{FileHandler, InboxWatcher, StopHandle, WatchBackend};
