//! Processing outcome status and input file kinds.

use std::fmt;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

/// Terminal status of one file ingestion attempt.
///
/// # Examples
///
/// ```
/// use brg_core::ProcessStatus;
///
/// assert_eq!(ProcessStatus::SkippedDuplicate.as_str(), "skipped_duplicate");
/// assert!(ProcessStatus::Error.is_error());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    /// Parsed and merged into the catalog.
    Success,
    /// Content already ingested; nothing was parsed.
    SkippedDuplicate,
    /// Failed and moved to the error directory.
    Error,
}

impl ProcessStatus {
    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::SkippedDuplicate => "skipped_duplicate",
            Self::Error => "error",
        }
    }

    /// Returns `true` for [`ProcessStatus::Error`].
    #[inline]
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported input formats, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Comma-separated values.
    Csv,
    /// Excel workbook (`.xlsx` or `.xls`).
    Xlsx,
    /// JSON document.
    Json,
    /// Plain text or Markdown.
    Txt,
}

impl FileKind {
    /// Detects the kind from a path's extension, case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use brg_core::FileKind;
    ///
    /// assert_eq!(FileKind::from_path("prices.XLS"), Some(FileKind::Xlsx));
    /// assert_eq!(FileKind::from_path("notes.md"), Some(FileKind::Txt));
    /// assert_eq!(FileKind::from_path("archive.zip"), None);
    /// ```
    #[must_use]
    pub fn from_path(path: impl AsRef<Utf8Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Xlsx),
            "json" => Some(Self::Json),
            "txt" | "md" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Json => "json",
            Self::Txt => "txt",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
