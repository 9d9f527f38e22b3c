//! Core types, errors, and utilities for the brg-ingest pipeline.
//!
//! This crate provides the foundational pieces used across the workspace:
//!
//! - Error types for configuration and filesystem helpers
//! - Configuration structures loaded from a config directory
//! - Domain types (`CanonicalField`, `CatalogRecord`, `ProcessStatus`)
//! - Text, number and brand normalization
//! - Archival file naming, content digests and atomic file writes
//! - Flat, sorted directory listing for the inbox and archives
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod digest;
pub mod error;
pub mod fs;
pub mod hash;
pub mod naming;
pub mod normalize;
pub mod types;
pub mod walk;

pub use config::{
    BrandFormat, Config, DimensionPattern, LimitsConfig, LogFormat, LoggingConfig,
    NormalizationConfig, ParsingRules, PathsConfig, RegistryConfig, RequiredFields, WatchMode,
    WatcherConfig,
};
pub use digest::sha256_file;
pub use error::{ConfigError, FsError};
pub use fs::{atomic_write, ensure_dir, move_file, unique_destination, utf8_path};
pub use hash::{FxHashMap, FxHashSet, fx_hash_map, fx_hash_set};
pub use naming::{MAX_STEM_LEN, SHORT_HASH_LEN, archive_file_name, safe_file_stem, short_hash};
pub use normalize::{normalize_brand, normalize_number, normalize_text};
pub use types::{
    CanonicalField, CanonicalRow, CatalogRecord, CellValue, Conflict, DedupKey, Dimensions,
    FileKind, ProcessStatus, RawTable, UnknownField, format_number,
};
pub use walk::{DirListing, is_candidate_name};
