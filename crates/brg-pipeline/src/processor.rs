//! The per-file ingestion state machine.
//!
//! [`FileProcessor::process_file`] takes one inbox file through
//!
//! ```text
//! received → size check → hashing → { duplicate | parsing } → merge → relocated → reported
//! ```
//!
//! and never fails: every error is turned into an error outcome, the file is
//! moved to the error directory and an error line is appended to the audit
//! log.

use std::time::Instant;

use brg_catalog::{CatalogManager, RebuildSummary, Registry, ReportEntry, Reporter};
use brg_core::{
    Config, DirListing, FileKind, FsError, ProcessStatus, archive_file_name, ensure_dir,
    move_file, sha256_file, unique_destination,
};
use brg_parser::DataParser;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;

use crate::error::ProcessError;
use crate::stats::{InboxSummary, ProcessStats};

/// Hash recorded when the content could not be read at all.
pub const UNKNOWN_HASH: &str = "unknown";

/// Result of one [`FileProcessor::process_file`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Terminal status.
    pub status: ProcessStatus,
    /// Rows read from the file, or the recorded count for a duplicate.
    pub n_rows: usize,
    /// Records added to the catalog.
    pub n_added: usize,
    /// Rows not added.
    pub n_skipped: usize,
    /// Records added despite a dimension conflict.
    pub n_conflicts: usize,
    /// Where the file was moved, if it was moved.
    pub destination: Option<Utf8PathBuf>,
    /// Failure message for error outcomes.
    pub error: Option<String>,
}

impl Default for ProcessOutcome {
    fn default() -> Self {
        Self {
            status: ProcessStatus::Success,
            n_rows: 0,
            n_added: 0,
            n_skipped: 0,
            n_conflicts: 0,
            destination: None,
            error: None,
        }
    }
}

/// Ingests inbox files into the catalog.
///
/// Owns the parser, catalog, registry and audit log for one set of
/// directories. Only one processor may operate on a directory set at a time.
///
/// # Examples
///
/// ```
/// use brg_core::{Config, ProcessStatus};
/// use brg_pipeline::FileProcessor;
///
/// let tmp = tempfile::tempdir().unwrap();
/// let root = camino::Utf8Path::from_path(tmp.path()).unwrap();
/// let config = Config::default().rooted_at(root);
///
/// let mut processor = FileProcessor::new(config.clone())?;
/// let file = config.paths.inbox.join("skf.csv");
/// std::fs::write(&file, "Артикул,Бренд,H\n6205,SKF,15\n").unwrap();
///
/// let outcome = processor.process_file(&file);
/// assert_eq!(outcome.status, ProcessStatus::Success);
/// assert_eq!(processor.catalog().len(), 1);
/// # Ok::<(), brg_pipeline::ProcessError>(())
/// ```
#[derive(Debug)]
pub struct FileProcessor {
    config: Config,
    parser: DataParser,
    catalog: CatalogManager,
    registry: Registry,
    reporter: Reporter,
    stats: ProcessStats,
}

impl FileProcessor {
    /// Creates a processor, creating every configured directory.
    ///
    /// Fails if a directory cannot be created, a dimension pattern does not
    /// compile or the audit log cannot be opened.
    pub fn new(config: Config) -> Result<Self, ProcessError> {
        for dir in config.paths.directories() {
            ensure_dir(dir)?;
        }

        let parser = DataParser::new(&config.parsing)?;
        let catalog = CatalogManager::from_config(&config);
        let registry = Registry::open(&config.registry.file);
        let reporter = Reporter::open(config.paths.report_file())?;

        tracing::info!(
            inbox = %config.paths.inbox,
            n_records = catalog.len(),
            n_registered = registry.len(),
            "processor ready"
        );

        Ok(Self {
            config,
            parser,
            catalog,
            registry,
            reporter,
            stats: ProcessStats::new(),
        })
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the catalog.
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &CatalogManager {
        &self.catalog
    }

    /// Returns the registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the lifetime counters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &ProcessStats {
        &self.stats
    }

    /// Ingests one file.
    ///
    /// The file always leaves the inbox: into the processed directory on
    /// success or duplicate, into the error directory otherwise. The only
    /// exception is a failure to move the file into the error directory,
    /// which is logged.
    pub fn process_file(&mut self, path: &Utf8Path) -> ProcessOutcome {
        let started = Instant::now();
        let filename = path.file_name().unwrap_or(path.as_str()).to_owned();
        let mut hash = None;

        let outcome = match self.try_process(path, &filename, &mut hash, started) {
            Ok(outcome) => outcome,
            Err(e) => self.fail(path, &filename, hash, &e, started),
        };

        self.stats.record(&outcome);
        outcome
    }

    /// Ingests every file currently in the inbox, in file name order.
    ///
    /// Hidden files, subdirectories and files with an ignored suffix are left
    /// alone. Per-file failures are counted, not returned.
    pub fn process_inbox(&mut self) -> Result<InboxSummary, ProcessError> {
        let files = DirListing::new(&self.config.paths.inbox)
            .with_ignored_suffixes(&self.config.watcher.ignored_suffixes)
            .collect_files()?;

        tracing::info!(inbox = %self.config.paths.inbox, n_files = files.len(), "processing inbox");

        let batch = ProcessStats::new();
        for path in &files {
            batch.record(&self.process_file(path));
        }

        let summary = batch.snapshot();
        tracing::info!(
            processed = summary.processed,
            succeeded = summary.succeeded,
            duplicates = summary.duplicates,
            failed = summary.failed,
            rows_added = summary.rows_added,
            "inbox pass complete"
        );
        Ok(summary)
    }

    /// Rebuilds the catalog from the processed archive.
    ///
    /// The registry is neither consulted nor modified.
    pub fn rebuild_catalog(&mut self) -> Result<RebuildSummary, ProcessError> {
        let summary = self
            .catalog
            .rebuild_from_processed(&self.config.paths.processed, &self.parser)?;
        tracing::info!(
            files = summary.files,
            records = summary.records,
            "catalog rebuilt from processed archive"
        );
        Ok(summary)
    }

    fn try_process(
        &mut self,
        path: &Utf8Path,
        filename: &str,
        hash: &mut Option<String>,
        started: Instant,
    ) -> Result<ProcessOutcome, ProcessError> {
        let size = std::fs::metadata(path)
            .map_err(|e| FsError::io(path, e))?
            .len();
        let limit = self.config.limits.max_file_size_bytes();
        if size > limit {
            return Err(ProcessError::FileTooLarge {
                path: path.to_owned(),
                size,
                limit,
            });
        }

        let sha = sha256_file(path)?;
        *hash = Some(sha.clone());

        if self.registry.is_processed(&sha) {
            return self.skip_duplicate(path, filename, &sha, started);
        }

        let kind = FileKind::from_path(path)
            .ok_or_else(|| ProcessError::UnsupportedFileType(path.to_owned()))?;

        let table = self.parser.parse(path, kind)?;
        let n_rows = table.len();
        let rows = self
            .parser
            .validate_required_fields(self.parser.normalize_columns(&table));
        if rows.is_empty() {
            return Err(ProcessError::NoValidRows {
                path: path.to_owned(),
            });
        }

        let records = self.catalog.normalize_data(&rows);
        let n_valid = records.len();
        let before = self.catalog.len();
        let summary = self.catalog.add_records(records);
        if let Err(e) = self.catalog.save() {
            self.catalog.truncate(before);
            return Err(e.into());
        }

        for conflict in &summary.conflicts {
            tracing::warn!(
                file = %filename,
                article = %conflict.article,
                brand = conflict.brand.as_deref().unwrap_or(""),
                new = ?conflict.new_dimensions,
                existing = ?conflict.existing_dimensions,
                "dimension conflict, record added alongside existing"
            );
        }

        let archive_name =
            archive_file_name(filename, n_valid, &sha, None, Local::now().naive_local());
        let destination = unique_destination(&self.config.paths.processed, &archive_name);
        move_file(path, &destination)?;

        let processed_name = destination.file_name().unwrap_or(archive_name.as_str());
        self.registry
            .add_entry(&sha, filename, processed_name, n_valid, ProcessStatus::Success)?;

        let n_conflicts = summary.n_conflicts();
        self.report(
            ReportEntry::new(filename, sha.as_str(), ProcessStatus::Success)
                .with_counts(n_rows, summary.added, summary.skipped, n_conflicts)
                .with_conflicts(summary.conflicts)
                .with_processing_time(started.elapsed()),
        );

        tracing::info!(
            file = %filename,
            sha = %sha,
            status = %ProcessStatus::Success,
            n_rows,
            n_added = summary.added,
            n_skipped = summary.skipped,
            n_conflicts,
            "file processed"
        );

        Ok(ProcessOutcome {
            status: ProcessStatus::Success,
            n_rows,
            n_added: summary.added,
            n_skipped: summary.skipped,
            n_conflicts,
            destination: Some(destination),
            error: None,
        })
    }

    fn skip_duplicate(
        &self,
        path: &Utf8Path,
        filename: &str,
        sha: &str,
        started: Instant,
    ) -> Result<ProcessOutcome, ProcessError> {
        let (n_records, archived_as) = self
            .registry
            .get_entry(sha)
            .map(|entry| (entry.n_records, entry.processed_name.clone()))
            .unwrap_or_default();
        let target_name = if archived_as.is_empty() {
            filename
        } else {
            archived_as.as_str()
        };

        let destination = unique_destination(&self.config.paths.processed, target_name);
        move_file(path, &destination)?;

        self.report(
            ReportEntry::new(filename, sha, ProcessStatus::SkippedDuplicate)
                .with_counts(n_records, 0, n_records, 0)
                .with_processing_time(started.elapsed()),
        );

        tracing::info!(
            file = %filename,
            sha = %sha,
            status = %ProcessStatus::SkippedDuplicate,
            n_rows = n_records,
            "duplicate content skipped"
        );

        Ok(ProcessOutcome {
            status: ProcessStatus::SkippedDuplicate,
            n_rows: n_records,
            n_skipped: n_records,
            destination: Some(destination),
            ..ProcessOutcome::default()
        })
    }

    fn fail(
        &self,
        path: &Utf8Path,
        filename: &str,
        hash: Option<String>,
        error: &ProcessError,
        started: Instant,
    ) -> ProcessOutcome {
        let sha = hash
            .or_else(|| sha256_file(path).ok())
            .unwrap_or_else(|| UNKNOWN_HASH.to_owned());
        let message = error.to_string();

        tracing::error!(
            file = %filename,
            sha = %sha,
            status = %ProcessStatus::Error,
            code = error.code(),
            error = %message,
            "file failed"
        );

        let destination = if path.as_std_path().is_file() {
            let name = archive_file_name(
                filename,
                0,
                &sha,
                Some(error.code()),
                Local::now().naive_local(),
            );
            let destination = unique_destination(&self.config.paths.error, &name);
            match move_file(path, &destination) {
                Ok(()) => Some(destination),
                Err(e) => {
                    tracing::error!(file = %filename, error = %e, "failed to move file to error directory");
                    None
                }
            }
        } else {
            None
        };

        self.report(
            ReportEntry::new(filename, sha.as_str(), ProcessStatus::Error)
                .with_error(message.as_str())
                .with_processing_time(started.elapsed()),
        );

        ProcessOutcome {
            status: ProcessStatus::Error,
            destination,
            error: Some(message),
            ..ProcessOutcome::default()
        }
    }

    fn report(&self, entry: ReportEntry) {
        if let Err(e) = self.reporter.write(&entry) {
            tracing::error!(file = %entry.filename, error = %e, "failed to write audit log entry");
        }
    }
}
