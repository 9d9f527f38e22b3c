//! Flat directory listing for the inbox and archive directories.
//!
//! This module provides [`DirListing`], which uses the `ignore` crate to list
//! the files directly inside one directory.
//!
//! # Features
//!
//! - Non-recursive: subdirectories are neither listed nor entered
//! - Skips hidden files and configured temporary suffixes
//! - Ignores `.gitignore`-style rules; every visible file is a unit of work
//! - Sorted by file name, so batch order is deterministic
//!
//! # Examples
//!
//! ```
//! use brg_core::DirListing;
//!
//! let tmp = tempfile::tempdir().unwrap();
//! let dir = camino::Utf8Path::from_path(tmp.path()).unwrap();
//! std::fs::write(dir.join("b.csv"), "").unwrap();
//! std::fs::write(dir.join("a.json"), "").unwrap();
//! std::fs::write(dir.join(".hidden.csv"), "").unwrap();
//! std::fs::write(dir.join("upload.csv.tmp"), "").unwrap();
//!
//! let files = DirListing::new(dir)
//!     .with_ignored_suffixes(&[".tmp".to_owned()])
//!     .collect_files()?;
//! let names: Vec<_> = files.iter().filter_map(|p| p.file_name()).collect();
//! assert_eq!(names, vec!["a.json", "b.csv"]);
//! # Ok::<(), brg_core::FsError>(())
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;

use crate::error::FsError;

/// Returns `true` if a file name should be handed to the processor.
///
/// Hidden names (leading `.`) and names ending in one of `ignored_suffixes`
/// are rejected.
///
/// # Examples
///
/// ```
/// use brg_core::is_candidate_name;
///
/// let suffixes = [".tmp".to_owned()];
/// assert!(is_candidate_name("prices.csv", &suffixes));
/// assert!(!is_candidate_name(".prices.csv", &suffixes));
/// assert!(!is_candidate_name("prices.csv.tmp", &suffixes));
/// ```
#[must_use]
pub fn is_candidate_name(name: &str, ignored_suffixes: &[String]) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !ignored_suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

/// Lists the regular files directly inside a directory.
#[derive(Debug, Clone)]
pub struct DirListing {
    /// The directory to list.
    dir: Utf8PathBuf,
    /// Name suffixes of files to leave out.
    ignored_suffixes: Vec<String>,
}

impl DirListing {
    /// Creates a listing of `dir` that skips only hidden files.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ignored_suffixes: Vec::new(),
        }
    }

    /// Also skips files whose names end in one of `suffixes`.
    #[must_use]
    pub fn with_ignored_suffixes(mut self, suffixes: &[String]) -> Self {
        self.ignored_suffixes.extend(suffixes.iter().cloned());
        self
    }

    /// Collects the file paths, sorted by file name.
    ///
    /// Entries that cannot be read and names that are not UTF-8 are logged
    /// and left out.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Walk`] if the directory itself cannot be read.
    pub fn collect_files(&self) -> Result<Vec<Utf8PathBuf>, FsError> {
        let mut files = Vec::new();

        for result in self.build_walker() {
            let entry = match result {
                Ok(entry) => entry,
                // Depth 0 is the listed directory itself
                Err(e) if e.depth().is_none_or(|depth| depth == 0) => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(dir = %self.dir, error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let Some(utf8) = Utf8Path::from_path(path) else {
                tracing::warn!(path = %path.display(), "skipping file with non-UTF-8 name");
                continue;
            };

            if !utf8
                .file_name()
                .is_some_and(|name| is_candidate_name(name, &self.ignored_suffixes))
            {
                continue;
            }

            files.push(utf8.to_owned());
        }

        Ok(files)
    }

    /// Returns the directory being listed.
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    fn build_walker(&self) -> ignore::Walk {
        WalkBuilder::new(&self.dir)
            // Only the directory itself and its direct children
            .max_depth(Some(1))
            .hidden(true)
            // Ignore files have no say over what is in an inbox
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build()
    }
}
