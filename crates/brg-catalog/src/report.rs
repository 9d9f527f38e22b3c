//! Append-only NDJSON audit log.
//!
//! One [`ReportEntry`] is written per file attempt, as a single JSON object
//! on its own line. Keys appear in a fixed order; `error` and `conflicts`
//! are omitted when empty.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::time::Duration;

use brg_core::{Conflict, ProcessStatus};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// One line of the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// When the entry was written.
    pub timestamp: DateTime<Utc>,
    /// File name as it arrived in the inbox.
    pub filename: String,
    /// Content hash, or `unknown` if hashing failed.
    pub sha256: String,
    /// Outcome of the attempt.
    pub status: ProcessStatus,
    /// Rows read from the file.
    pub n_rows: usize,
    /// Records added to the catalog.
    pub n_added: usize,
    /// Rows skipped as duplicates or for lacking an article.
    pub n_skipped: usize,
    /// Records added despite a dimension conflict.
    pub n_conflicts: usize,
    /// Failure message for [`ProcessStatus::Error`] entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall time spent on the file, in seconds with millisecond precision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_sec: Option<f64>,
    /// Conflict descriptors for the added records.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<Conflict>,
}

impl ReportEntry {
    /// Creates an entry stamped with the current time and zero counts.
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        sha256: impl Into<String>,
        status: ProcessStatus,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            filename: filename.into(),
            sha256: sha256.into(),
            status,
            n_rows: 0,
            n_added: 0,
            n_skipped: 0,
            n_conflicts: 0,
            error: None,
            processing_time_sec: None,
            conflicts: Vec::new(),
        }
    }

    /// Sets the row counters.
    #[must_use]
    pub fn with_counts(
        mut self,
        n_rows: usize,
        n_added: usize,
        n_skipped: usize,
        n_conflicts: usize,
    ) -> Self {
        self.n_rows = n_rows;
        self.n_added = n_added;
        self.n_skipped = n_skipped;
        self.n_conflicts = n_conflicts;
        self
    }

    /// Sets the failure message.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Sets the processing time, rounded to milliseconds.
    #[must_use]
    pub fn with_processing_time(mut self, elapsed: Duration) -> Self {
        self.processing_time_sec = Some((elapsed.as_secs_f64() * 1000.0).round() / 1000.0);
        self
    }

    /// Attaches conflict descriptors.
    #[must_use]
    pub fn with_conflicts(mut self, conflicts: Vec<Conflict>) -> Self {
        self.conflicts = conflicts;
        self
    }
}

/// Appends [`ReportEntry`] lines to the audit log.
///
/// Each entry is encoded up front and written with a single call while the
/// file lock is held, so concurrent writers never interleave lines.
///
/// # Examples
///
/// ```
/// use brg_catalog::{ReportEntry, Reporter};
/// use brg_core::ProcessStatus;
///
/// let tmp = tempfile::tempdir().unwrap();
/// let path = camino::Utf8Path::from_path(tmp.path()).unwrap().join("out/run_report.ndjson");
///
/// let reporter = Reporter::open(&path)?;
/// reporter.write(&ReportEntry::new("a.csv", "abc", ProcessStatus::Success).with_counts(2, 2, 0, 0))?;
///
/// let entries = Reporter::read_all(&path)?;
/// assert_eq!(entries[0].n_added, 2);
/// # Ok::<(), brg_catalog::ReportError>(())
/// ```
#[derive(Debug)]
pub struct Reporter {
    path: Utf8PathBuf,
    file: Mutex<File>,
}

impl Reporter {
    /// Opens the audit log for appending, creating it and its directory.
    pub fn open(path: impl Into<Utf8PathBuf>) -> Result<Self, ReportError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ReportError::io(&path, e))?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Appends one entry.
    pub fn write(&self, entry: &ReportEntry) -> Result<(), ReportError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut file = self.file.lock();
        file.write_all(&line)
            .and_then(|()| file.flush())
            .map_err(|e| ReportError::io(&self.path, e))
    }

    /// Returns the audit log path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Reads every entry from an audit log.
    ///
    /// Blank lines are ignored. A missing file yields no entries.
    pub fn read_all(path: impl AsRef<Utf8Path>) -> Result<Vec<ReportEntry>, ReportError> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ReportError::io(path, e)),
        };

        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| ReportError::io(path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brg_core::Dimensions;
    use smallvec::smallvec;

    fn tmp_path() -> (tempfile::TempDir, Utf8PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(tmp.path().join("out/run_report.ndjson")).unwrap();
        (tmp, path)
    }

    #[test]
    fn test_key_order_and_omissions() {
        let entry = ReportEntry::new("a.csv", "abc", ProcessStatus::Success)
            .with_counts(3, 2, 1, 0)
            .with_processing_time(Duration::from_micros(12_345_678));
        let json = serde_json::to_value(&entry).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                "timestamp",
                "filename",
                "sha256",
                "status",
                "n_rows",
                "n_added",
                "n_skipped",
                "n_conflicts",
                "processing_time_sec",
            ]
        );
        assert_eq!(json["processing_time_sec"], 12.346);
    }

    #[test]
    fn test_error_entry() {
        let entry = ReportEntry::new("bad.png", "unknown", ProcessStatus::Error)
            .with_error("unsupported file type: bad.png");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["n_rows"], 0);
        assert_eq!(json["error"], "unsupported file type: bad.png");
    }

    #[test]
    fn test_appends_lines() {
        let (_tmp, path) = tmp_path();
        let reporter = Reporter::open(&path).unwrap();
        reporter
            .write(&ReportEntry::new("a.csv", "h1", ProcessStatus::Success))
            .unwrap();
        drop(reporter);

        let reporter = Reporter::open(&path).unwrap();
        let conflict = Conflict {
            article: "6205".to_owned(),
            brand: Some("SKF".to_owned()),
            new_dimensions: Dimensions {
                height: Some(18.0),
                ..Dimensions::default()
            },
            existing_dimensions: smallvec![Dimensions {
                height: Some(15.0),
                ..Dimensions::default()
            }],
        };
        reporter
            .write(
                &ReportEntry::new("b.csv", "h2", ProcessStatus::Success)
                    .with_counts(1, 1, 0, 1)
                    .with_conflicts(vec![conflict.clone()]),
            )
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);

        let entries = Reporter::read_all(&path).unwrap();
        assert_eq!(entries[0].filename, "a.csv");
        assert_eq!(entries[1].n_conflicts, 1);
        assert_eq!(entries[1].conflicts, vec![conflict]);
    }

    #[test]
    fn test_read_missing_file() {
        let (_tmp, path) = tmp_path();
        assert!(Reporter::read_all(&path).unwrap().is_empty());
    }
}
