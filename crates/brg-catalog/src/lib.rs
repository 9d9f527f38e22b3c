//! Catalog, registry and audit log for the brg-ingest pipeline.
//!
//! This crate owns every piece of persistent pipeline state:
//!
//! - [`CatalogManager`]: the canonical catalog with its dedup and conflict
//!   rule, stored as `catalog_target.csv` plus a JSON mirror
//! - [`Registry`]: content hashes of ingested files, the idempotency check
//! - [`Reporter`]: the append-only NDJSON audit log
//!
//! The catalog and registry are replaced atomically on every write, so a
//! crash never leaves either half-written.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod catalog;
mod error;
mod registry;
mod report;

pub use catalog::{AddSummary, CatalogManager, RebuildSummary};
pub use error::{CatalogError, RegistryError, ReportError};
pub use registry::{Registry, RegistryEntry};
pub use report::{ReportEntry, Reporter};
