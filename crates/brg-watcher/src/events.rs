//! Inbox arrival events.
//!
//! ```text
//! OS event / poll listing / startup drain
//!        │
//!        ▼
//!   FileEvent created
//!        │
//!        ▼
//!   gate: session set → filter → settle delay → still exists?
//!        │
//!        ▼
//!   FileHandler::handle
//! ```

use std::time::Instant;

use camino::Utf8PathBuf;

/// How a file was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrivalKind {
    /// Already in the inbox when the watcher started.
    Existing,
    /// Reported by the OS as newly created.
    Created,
    /// Reported by the OS as renamed or moved into the inbox.
    MovedIn,
    /// Found by a periodic inbox listing.
    Polled,
}

/// A file that appeared in the inbox.
///
/// # Examples
///
/// ```
/// use brg_watcher::{ArrivalKind, FileEvent};
/// use camino::Utf8PathBuf;
///
/// let event = FileEvent::new(Utf8PathBuf::from("/data/inbox/prices.xlsx"), ArrivalKind::Polled);
/// assert_eq!(event.kind, ArrivalKind::Polled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// Absolute path of the file.
    pub path: Utf8PathBuf,

    /// How the file was discovered.
    pub kind: ArrivalKind,

    /// When the event was received.
    pub timestamp: Instant,
}

impl FileEvent {
    /// Creates an event stamped with the current instant.
    #[inline]
    #[must_use]
    pub fn new(path: Utf8PathBuf, kind: ArrivalKind) -> Self {
        Self {
            path,
            kind,
            timestamp: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_is_stamped_on_creation() {
        let event = FileEvent::new(Utf8PathBuf::from("/inbox/README"), ArrivalKind::Created);
        assert_eq!(event.path, "/inbox/README");
        assert!(event.timestamp.elapsed().as_secs() < 5);
    }
}
