//! Error types for the brg-pipeline crate.

use brg_catalog::{CatalogError, RegistryError, ReportError};
use brg_core::FsError;
use brg_parser::ParseError;
use camino::Utf8PathBuf;

/// Errors that end the processing of one file.
///
/// # Error Recovery Strategy
///
/// Every variant is terminal for the file it occurred on: the file is moved
/// to the error directory with the marker from [`code`](Self::code) and an
/// error line is written to the audit log. Processing of other files is not
/// affected.
///
/// When returned from [`FileProcessor::new`](crate::FileProcessor::new) or
/// [`FileProcessor::process_inbox`](crate::FileProcessor::process_inbox) the
/// error is a setup or listing failure and is fatal for the caller.
///
/// # Examples
///
/// ```
/// use brg_pipeline::ProcessError;
///
/// let err = ProcessError::FileTooLarge {
///     path: "inbox/huge.csv".into(),
///     size: 60 * 1024 * 1024,
///     limit: 50 * 1024 * 1024,
/// };
/// assert_eq!(err.code(), "SIZE");
/// assert!(err.is_input_error());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The file exceeds the configured size ceiling.
    #[error("file {path} is {size} bytes, above the {limit} byte limit")]
    FileTooLarge {
        /// The offending file.
        path: Utf8PathBuf,
        /// Its size in bytes.
        size: u64,
        /// The configured ceiling in bytes.
        limit: u64,
    },

    /// The file extension is not one of the supported formats.
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(Utf8PathBuf),

    /// The file could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Every row lacked the required fields.
    #[error("no valid rows in {path}")]
    NoValidRows {
        /// The file that yielded nothing.
        path: Utf8PathBuf,
    },

    /// The catalog could not be saved.
    #[error("catalog update failed: {0}")]
    Catalog(#[from] CatalogError),

    /// The registry could not be saved.
    #[error("registry update failed: {0}")]
    Registry(#[from] RegistryError),

    /// The audit log could not be opened.
    #[error("audit log unavailable: {0}")]
    Report(#[from] ReportError),

    /// A filesystem operation failed.
    #[error(transparent)]
    Io(#[from] FsError),
}

impl ProcessError {
    /// Returns the marker embedded in error archive names.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileTooLarge { .. } => "SIZE",
            Self::UnsupportedFileType(_) | Self::Parse(ParseError::UnsupportedFileType(_)) => {
                "UNSUPPORTED_TYPE"
            }
            Self::Parse(ParseError::UnsupportedEncoding { .. }) => "ENCODING",
            Self::Parse(ParseError::UnsupportedStructure { .. }) => "STRUCTURE",
            Self::Parse(ParseError::NoTabularData { .. }) => "NO_DATA",
            Self::Parse(_) => "PARSE_ERROR",
            Self::NoValidRows { .. } => "NO_VALID_ROWS",
            Self::Catalog(_) => "CATALOG",
            Self::Registry(_) => "REGISTRY",
            Self::Report(_) => "REPORT",
            Self::Io(_) => "IO",
        }
    }

    /// Returns `true` for problems with the file itself rather than the system.
    ///
    /// Input errors are expected and never retried; everything else points
    /// at the environment (disk, permissions).
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::FileTooLarge { .. }
                | Self::UnsupportedFileType(_)
                | Self::Parse(_)
                | Self::NoValidRows { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_codes() {
        let path = Utf8PathBuf::from("inbox/a.csv");
        let cases = [
            (
                ParseError::UnsupportedEncoding { path: path.clone() },
                "ENCODING",
            ),
            (
                ParseError::UnsupportedStructure {
                    path: path.clone(),
                    found: "number",
                },
                "STRUCTURE",
            ),
            (ParseError::NoTabularData { path: path.clone() }, "NO_DATA"),
            (
                ParseError::io(path.clone(), std::io::Error::other("boom")),
                "PARSE_ERROR",
            ),
        ];
        for (err, code) in cases {
            assert_eq!(ProcessError::from(err).code(), code);
        }
    }

    #[test]
    fn test_system_errors_are_not_input_errors() {
        let err = ProcessError::from(FsError::io(
            "processed/x.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        ));
        assert_eq!(err.code(), "IO");
        assert!(!err.is_input_error());
        assert!(err.to_string().contains("processed/x.csv"));
    }

    #[test]
    fn test_no_valid_rows_display() {
        let err = ProcessError::NoValidRows {
            path: "inbox/empty.csv".into(),
        };
        assert_eq!(err.code(), "NO_VALID_ROWS");
        assert_eq!(err.to_string(), "no valid rows in inbox/empty.csv");
    }
}
