//! Error types for the brg-parser crate.
//!
//! This module provides the [`ParseError`] type for errors that can occur
//! while reading a source file into a table.

use camino::Utf8PathBuf;

/// Errors that can occur while parsing a source file.
///
/// Input problems (unknown encoding, unexpected JSON shape, nothing
/// tabular) are distinguished from format-level failures so callers can
/// report a precise cause.
///
/// # Examples
///
/// ```
/// use brg_parser::ParseError;
///
/// fn describe(err: &ParseError) -> &'static str {
///     match err {
///         ParseError::UnsupportedEncoding { .. } => "encoding",
///         ParseError::UnsupportedStructure { .. } => "structure",
///         ParseError::NoTabularData { .. } => "no data",
///         _ => "parse",
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Reading the file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file being read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension is not a supported input format.
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(Utf8PathBuf),

    /// None of the supported encodings produced a readable table.
    #[error("could not decode {path} with any supported encoding")]
    UnsupportedEncoding {
        /// The file being parsed.
        path: Utf8PathBuf,
    },

    /// A JSON document is neither an array, an object nor an object holding an array.
    #[error("unsupported JSON structure in {path}: top-level {found}")]
    UnsupportedStructure {
        /// The file being parsed.
        path: Utf8PathBuf,
        /// The JSON type found at the top level.
        found: &'static str,
    },

    /// The file contains no extractable rows.
    #[error("no tabular data found in {path}")]
    NoTabularData {
        /// The file being parsed.
        path: Utf8PathBuf,
    },

    /// The CSV reader rejected the file.
    #[error("invalid CSV in {path}: {source}")]
    Csv {
        /// The file being parsed.
        path: Utf8PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// The workbook could not be opened or read.
    #[error("invalid workbook {path}: {source}")]
    Xlsx {
        /// The file being parsed.
        path: Utf8PathBuf,
        /// The underlying calamine error.
        #[source]
        source: calamine::Error,
    },

    /// The JSON document is malformed.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// The file being parsed.
        path: Utf8PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A configured dimension pattern is not usable.
    #[error("invalid dimension pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern source text.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ParseError {
    /// Creates a new [`ParseError::Io`] error.
    #[inline]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Io { path, .. }
            | Self::UnsupportedEncoding { path }
            | Self::UnsupportedStructure { path, .. }
            | Self::NoTabularData { path }
            | Self::Csv { path, .. }
            | Self::Xlsx { path, .. }
            | Self::Json { path, .. } => Some(path),
            Self::UnsupportedFileType(path) => Some(path),
            Self::InvalidPattern { .. } => None,
        }
    }
}
