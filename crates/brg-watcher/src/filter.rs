//! Arrival filtering.
//!
//! The [`FileFilter`] trait decides whether a discovered file is handed to
//! the processor. It runs on the notify thread for OS events and again in
//! the dispatch gate, so implementations must be cheap and thread-safe.
//!
//! # Examples
//!
//! ```
//! use brg_watcher::{FileFilter, InboxFilter};
//! use camino::Utf8Path;
//!
//! let filter = InboxFilter::new(&[".tmp".to_owned(), ".part".to_owned()]);
//!
//! assert!(filter.should_process(Utf8Path::new("/inbox/prices.csv")));
//! assert!(filter.should_process(Utf8Path::new("/inbox/manual.pdf")));
//! assert!(!filter.should_process(Utf8Path::new("/inbox/.~lock.prices.csv#")));
//! assert!(!filter.should_process(Utf8Path::new("/inbox/upload.xlsx.part")));
//! ```

use brg_core::is_candidate_name;
use camino::Utf8Path;

/// A predicate over discovered file paths.
pub trait FileFilter: Send + Sync + 'static {
    /// Returns `true` if the file should be handed to the processor.
    fn should_process(&self, path: &Utf8Path) -> bool;
}

/// A filter that accepts every file.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilter;

impl FileFilter for AcceptAllFilter {
    #[inline]
    fn should_process(&self, _path: &Utf8Path) -> bool {
        true
    }
}

/// Rejects hidden files and files still being uploaded.
///
/// Unsupported extensions pass: the processor moves them to the error
/// directory so they do not linger in the inbox.
#[derive(Debug, Clone, Default)]
pub struct InboxFilter {
    ignored_suffixes: Vec<String>,
}

impl InboxFilter {
    /// Creates a filter that also rejects names ending in `ignored_suffixes`.
    #[must_use]
    pub fn new(ignored_suffixes: &[String]) -> Self {
        Self {
            ignored_suffixes: ignored_suffixes.to_vec(),
        }
    }
}

impl FileFilter for InboxFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        path.file_name()
            .is_some_and(|name| is_candidate_name(name, &self.ignored_suffixes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_all() {
        assert!(AcceptAllFilter.should_process(Utf8Path::new(".hidden")));
    }

    #[test]
    fn test_inbox_filter_defaults_to_hidden_only() {
        let filter = InboxFilter::default();
        assert!(filter.should_process(Utf8Path::new("a.csv.tmp")));
        assert!(!filter.should_process(Utf8Path::new(".a.csv")));
        assert!(!filter.should_process(Utf8Path::new("/")));
    }

    #[test]
    fn test_inbox_filter_checks_file_name_only() {
        let filter = InboxFilter::new(&[".tmp".to_owned()]);
        assert!(filter.should_process(Utf8Path::new("/srv/.data/inbox/prices.csv")));
        assert!(!filter.should_process(Utf8Path::new("/srv/inbox/prices.csv.tmp")));
    }
}
