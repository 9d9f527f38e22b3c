//! Error types for the brg-catalog crate.
//!
//! One enum per component: [`CatalogError`] for the catalog files,
//! [`RegistryError`] for the processed-file registry and [`ReportError`]
//! for the audit log.

use brg_core::FsError;
use camino::Utf8PathBuf;

/// Errors raised while loading, rebuilding or saving the catalog.
///
/// # Error Recovery Strategy
///
/// - **Save errors** leave the previous catalog files intact; the caller
///   rolls back its in-memory additions with
///   [`CatalogManager::truncate`](crate::CatalogManager::truncate)
/// - **Rebuild listing errors** are fatal for the rebuild; per-file parse
///   failures during a rebuild are skipped, not reported as errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A catalog file could not be read or written.
    #[error(transparent)]
    Io(#[from] FsError),

    /// The catalog CSV could not be produced.
    #[error("failed to encode catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The catalog JSON mirror could not be produced.
    #[error("failed to encode catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the processed-file registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The registry file could not be written.
    #[error(transparent)]
    Io(#[from] FsError),

    /// The registry could not be serialized.
    #[error("failed to encode registry: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the audit reporter.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The report file could not be opened, written or read.
    #[error("I/O error on report {path}: {source}")]
    Io {
        /// The report file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A report line could not be encoded or decoded.
    #[error("invalid report line: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    /// Creates a new [`ReportError::Io`] error.
    #[inline]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_catalog_io_is_transparent() {
        let err = CatalogError::from(FsError::io(
            "out/catalog_target.csv",
            io::Error::new(io::ErrorKind::StorageFull, "disk full"),
        ));
        let msg = err.to_string();
        assert!(msg.contains("out/catalog_target.csv"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn test_report_io_display() {
        let err = ReportError::io(
            "out/run_report.ndjson",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("out/run_report.ndjson"));
    }
}
