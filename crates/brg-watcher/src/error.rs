//! Error types for the brg-watcher crate.

use camino::{Utf8Path, Utf8PathBuf};

/// Errors that can occur while setting up or running the inbox watcher.
///
/// # Error Recovery Strategy
///
/// - **Notify errors** ([`WatchError::Notify`]): Recovered at construction by
///   falling back to polling; fatal if raised while running
/// - **Path not found** ([`WatchError::PathNotFound`]): Fatal - the inbox must exist
/// - **Channel closed** ([`WatchError::ChannelClosed`]): Fatal - the event source is gone
/// - **Non-UTF-8 path** ([`WatchError::NonUtf8Path`]): Recoverable - skip and continue
/// - **I/O errors** ([`WatchError::Io`]): Fatal - propagate immediately
///
/// # Examples
///
/// ```
/// use brg_watcher::WatchError;
///
/// let err = WatchError::path_not_found("data/inbox");
/// assert!(err.is_fatal());
/// assert_eq!(err.path().map(|p| p.as_str()), Some("data/inbox"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to initialize or operate the OS event watcher.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The inbox directory does not exist.
    #[error("inbox does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The event channel closed while the watcher was still running.
    #[error("event channel closed unexpectedly")]
    ChannelClosed,

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// An I/O error occurred while resolving the inbox.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    /// Creates a new [`WatchError::NonUtf8Path`] error.
    #[inline]
    pub fn non_utf8_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self::NonUtf8Path(path.into())
    }

    /// Returns `true` if the watcher can skip the offending item and continue.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NonUtf8Path(_))
    }

    /// Returns `true` if the watcher cannot continue.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the UTF-8 path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::PathNotFound(path) => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_not_found() {
        let err = WatchError::path_not_found("/missing/inbox");
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "inbox does not exist: /missing/inbox");
        assert_eq!(err.path(), Some(Utf8Path::new("/missing/inbox")));
    }

    #[test]
    fn test_non_utf8_is_recoverable() {
        let err = WatchError::non_utf8_path("/tmp/x");
        assert!(err.is_recoverable());
        assert!(err.path().is_none());
    }

    #[test]
    fn test_channel_closed_is_fatal() {
        assert!(WatchError::ChannelClosed.is_fatal());
    }
}
