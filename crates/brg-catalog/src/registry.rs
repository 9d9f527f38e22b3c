//! Content-hash registry of ingested files.
//!
//! This module provides [`Registry`], which records every file the pipeline
//! has finished with, keyed by the SHA-256 of its content. The registry is
//! what makes ingestion idempotent: a file whose hash is already present is
//! not parsed again, whatever its name.
//!
//! # File Format
//!
//! A single JSON object, rewritten atomically after every insert:
//!
//! ```json
//! {
//!   "9f86d081...": {
//!     "original_name": "skf_prices.csv",
//!     "processed_name": "20240305_140709__skf_prices__2__9f86d081.csv",
//!     "n_records": 2,
//!     "status": "success",
//!     "timestamp": "2024-03-05T14:07:09Z"
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use brg_core::{ProcessStatus, atomic_write};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Metadata stored for one ingested file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// File name as it arrived in the inbox.
    pub original_name: String,
    /// File name in the processed archive.
    pub processed_name: String,
    /// Number of records the file contributed.
    pub n_records: usize,
    /// Outcome recorded for the file.
    pub status: ProcessStatus,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Persistent map from content hash to [`RegistryEntry`].
///
/// # Examples
///
/// ```
/// use brg_catalog::Registry;
/// use brg_core::ProcessStatus;
///
/// let tmp = tempfile::tempdir().unwrap();
/// let path = camino::Utf8Path::from_path(tmp.path()).unwrap().join("registry.json");
///
/// let mut registry = Registry::open(&path);
/// assert!(!registry.is_processed("abc"));
///
/// registry.add_entry("abc", "in.csv", "archived.csv", 3, ProcessStatus::Success)?;
/// assert!(Registry::open(&path).is_processed("abc"));
/// # Ok::<(), brg_catalog::RegistryError>(())
/// ```
#[derive(Debug)]
pub struct Registry {
    path: Utf8PathBuf,
    entries: BTreeMap<String, RegistryEntry>,
}

impl Registry {
    /// Opens the registry at `path`.
    ///
    /// A missing file yields an empty registry. A corrupt file is logged and
    /// also yields an empty registry.
    #[must_use]
    pub fn open(path: impl Into<Utf8PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(file = %path, error = %e, "registry corrupt, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(file = %path, error = %e, "registry unreadable, starting empty");
                BTreeMap::new()
            }
        };

        tracing::debug!(file = %path, n_entries = entries.len(), "registry loaded");
        Self { path, entries }
    }

    /// Returns `true` if content with this hash was already ingested.
    #[inline]
    #[must_use]
    pub fn is_processed(&self, hash: &str) -> bool {
        self.entries.contains_key(hash)
    }

    /// Returns the entry for a hash, if any.
    #[must_use]
    pub fn get_entry(&self, hash: &str) -> Option<&RegistryEntry> {
        self.entries.get(hash)
    }

    /// Records a file and persists the registry.
    ///
    /// Returns `Ok(false)` without touching anything if the hash is already
    /// present. If persisting fails the insert is undone, so memory and disk
    /// stay in agreement.
    pub fn add_entry(
        &mut self,
        hash: &str,
        original_name: &str,
        processed_name: &str,
        n_records: usize,
        status: ProcessStatus,
    ) -> Result<bool, RegistryError> {
        if self.entries.contains_key(hash) {
            return Ok(false);
        }

        self.entries.insert(
            hash.to_owned(),
            RegistryEntry {
                original_name: original_name.to_owned(),
                processed_name: processed_name.to_owned(),
                n_records,
                status,
                timestamp: Utc::now(),
            },
        );

        if let Err(e) = self.persist() {
            self.entries.remove(hash);
            return Err(e);
        }
        Ok(true)
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the registry has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the registry file path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn persist(&self) -> Result<(), RegistryError> {
        let json = serde_json::to_vec_pretty(&self.entries)?;
        atomic_write(&self.path, &json)?;
        Ok(())
    }
}
