//! Inbox watcher with OS events and a polling fallback.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 notify thread (Events backend)               │
//! │  ┌──────────────────┐    ┌──────────────────────────────┐    │
//! │  │ RecommendedWatcher│ -> │ callback: create / moved-in, │    │
//! │  │ (non-recursive)  │    │ UTF-8 check, FileFilter      │    │
//! │  └──────────────────┘    └──────────────┬───────────────┘    │
//! └─────────────────────────────────────────│────────────────────┘
//!                                           │ blocking_send
//!                                           ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 InboxWatcher::start (tokio)                  │
//! │  select! { stop token, event channel | poll sleep }          │
//! │        │                                                     │
//! │        ▼                                                     │
//! │  gate -> FileHandler::handle (runs to completion)            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use brg_core::WatcherConfig;
//! use brg_watcher::{InboxFilter, InboxWatcher};
//! use camino::Utf8Path;
//!
//! # async fn example() -> Result<(), brg_watcher::WatchError> {
//! let config = WatcherConfig::default();
//! let filter = InboxFilter::new(&config.ignored_suffixes);
//! let mut watcher = InboxWatcher::new(Utf8Path::new("data/inbox"), &config, filter)?;
//!
//! let stop = watcher.stop_handle();
//! tokio::spawn(async move {
//!     let _ = tokio::signal::ctrl_c().await;
//!     stop.stop();
//! });
//!
//! watcher
//!     .start(true, &mut |path: &Utf8Path| println!("new file: {path}"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use brg_core::{DirListing, FxHashSet, WatchMode, WatcherConfig, fx_hash_set};
use camino::{Utf8Path, Utf8PathBuf};
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::error::WatchError;
use crate::events::{ArrivalKind, FileEvent};
use crate::filter::{FileFilter, InboxFilter};

/// Default channel capacity for OS file events.
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Receives files that passed the watcher's gate.
///
/// Implemented for every `FnMut(&Utf8Path)`, so a closure is usually enough.
pub trait FileHandler {
    /// Handles one file. Runs to completion before the watcher looks at
    /// the next file or at a stop request.
    fn handle(&mut self, path: &Utf8Path);
}

impl<F> FileHandler for F
where
    F: FnMut(&Utf8Path),
{
    #[inline]
    fn handle(&mut self, path: &Utf8Path) {
        self(path);
    }
}

/// Requests termination of a running [`InboxWatcher`].
///
/// Cheap to clone; all clones control the same watcher.
#[derive(Debug, Clone)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    /// Stops the watcher after the file currently being handled, if any.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Returns `true` once [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// The detection strategy in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchBackend {
    /// OS file-system notifications.
    Events,
    /// Periodic inbox listing.
    Poll,
}

impl WatchBackend {
    /// Returns the backend name as used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Poll => "poll",
        }
    }
}

impl fmt::Display for WatchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum Source {
    Events {
        /// Keeps the OS subscription alive.
        _watcher: RecommendedWatcher,
        rx: mpsc::Receiver<FileEvent>,
    },
    Poll,
}

/// Surfaces new inbox files to a [`FileHandler`].
///
/// # Lifecycle
///
/// 1. **Creation**: [`InboxWatcher::new`] resolves the inbox and picks the
///    backend. `Events` mode subscribes to OS notifications right away so
///    nothing dropped during the startup drain is missed; if that fails the
///    watcher polls instead.
///
/// 2. **Running**: [`InboxWatcher::start`] optionally drains files already
///    present, then waits for arrivals until stopped.
///
/// 3. **Stopping**: [`StopHandle::stop`] ends `start` within one loop
///    iteration. A file being handled is never interrupted.
///
/// # Gating
///
/// Every candidate passes the same checks before reaching the handler: not
/// yet handled in this session, accepted by the filter, still present after
/// the settle delay.
pub struct InboxWatcher<F: FileFilter = InboxFilter> {
    listing: DirListing,
    poll_interval: Duration,
    source: Source,
    gate: Gate<F>,
    token: CancellationToken,
}

impl<F: FileFilter> fmt::Debug for InboxWatcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboxWatcher")
            .field("inbox", &self.inbox())
            .field("backend", &self.backend())
            .field("poll_interval", &self.poll_interval)
            .field("handled", &self.gate.seen.len())
            .finish_non_exhaustive()
    }
}

impl<F: FileFilter> InboxWatcher<F> {
    /// Creates a watcher for `inbox`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathNotFound`] if `inbox` is not a directory and
    /// [`WatchError::Io`] if it cannot be resolved to an absolute UTF-8 path.
    /// A failing OS event backend is not an error; the watcher polls instead.
    pub fn new(inbox: &Utf8Path, config: &WatcherConfig, filter: F) -> Result<Self, WatchError> {
        if !inbox.is_dir() {
            return Err(WatchError::path_not_found(inbox));
        }
        let inbox = inbox.canonicalize_utf8()?;

        let filter = Arc::new(filter);
        let source = match config.mode {
            WatchMode::Poll => Source::Poll,
            WatchMode::Events => match subscribe(&inbox, Arc::clone(&filter)) {
                Ok(source) => source,
                Err(e) => {
                    warn!(error = %e, inbox = %inbox, "OS file events unavailable, falling back to polling");
                    Source::Poll
                }
            },
        };

        Ok(Self {
            listing: DirListing::new(inbox).with_ignored_suffixes(&config.ignored_suffixes),
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            source,
            gate: Gate::new(filter, Duration::from_millis(config.settle_delay_ms)),
            token: CancellationToken::new(),
        })
    }

    /// Returns the absolute inbox path.
    #[inline]
    #[must_use]
    pub fn inbox(&self) -> &Utf8Path {
        self.listing.dir()
    }

    /// Returns the backend chosen at construction.
    #[must_use]
    pub fn backend(&self) -> WatchBackend {
        match self.source {
            Source::Events { .. } => WatchBackend::Events,
            Source::Poll => WatchBackend::Poll,
        }
    }

    /// Returns a handle that stops this watcher.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            token: self.token.clone(),
        }
    }

    /// Returns the number of files handed to the handler so far.
    #[inline]
    #[must_use]
    pub fn handled(&self) -> usize {
        self.gate.seen.len()
    }

    /// Runs until stopped, passing each new inbox file to `handler`.
    ///
    /// With `process_existing`, files already in the inbox are handled
    /// first, in file-name order.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::ChannelClosed`] if the OS event stream ends
    /// while the watcher is still running. Listing failures in polling
    /// mode are logged and retried on the next tick.
    pub async fn start<H: FileHandler>(
        &mut self,
        process_existing: bool,
        handler: &mut H,
    ) -> Result<(), WatchError> {
        info!(
            inbox = %self.inbox(),
            backend = %self.backend(),
            poll_interval_secs = self.poll_interval.as_secs(),
            "watching inbox"
        );

        if process_existing {
            let drained = self
                .gate
                .drain(&self.listing, &self.token, ArrivalKind::Existing, handler)
                .await;
            info!(files = drained, "processed files already in inbox");
        }

        let result = match &mut self.source {
            Source::Events { rx, .. } => loop {
                let event = tokio::select! {
                    () = self.token.cancelled() => break Ok(()),
                    event = rx.recv() => event,
                };
                match event {
                    Some(event) => {
                        self.gate.dispatch(event, handler).await;
                    }
                    None => break Err(WatchError::ChannelClosed),
                }
            },
            Source::Poll => loop {
                self.gate
                    .drain(&self.listing, &self.token, ArrivalKind::Polled, handler)
                    .await;
                tokio::select! {
                    () = self.token.cancelled() => break Ok(()),
                    () = tokio::time::sleep(self.poll_interval) => {}
                }
            },
        };

        info!(handled = self.handled(), "watcher stopped");
        result
    }
}

/// Per-file checks shared by every backend.
struct Gate<F> {
    filter: Arc<F>,
    settle_delay: Duration,
    /// Absolute paths already handed to the handler this session.
    seen: FxHashSet<Utf8PathBuf>,
}

impl<F: FileFilter> Gate<F> {
    fn new(filter: Arc<F>, settle_delay: Duration) -> Self {
        Self {
            filter,
            settle_delay,
            seen: fx_hash_set(),
        }
    }

    /// Hands `event.path` to `handler` if it passes every check.
    ///
    /// Returns `true` if the handler ran.
    async fn dispatch<H: FileHandler>(&mut self, event: FileEvent, handler: &mut H) -> bool {
        if self.seen.contains(&event.path) {
            trace!(path = %event.path, "already handled in this session");
            return false;
        }
        if !self.filter.should_process(&event.path) {
            trace!(path = %event.path, "filtered out");
            return false;
        }

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        if !event.path.is_file() {
            debug!(path = %event.path, "file gone before processing");
            return false;
        }

        debug!(
            path = %event.path,
            kind = ?event.kind,
            queued_ms = event.timestamp.elapsed().as_millis(),
            "dispatching file"
        );
        handler.handle(&event.path);
        self.seen.insert(event.path);
        true
    }

    /// Dispatches every file currently in the inbox.
    ///
    /// Returns how many files reached the handler.
    async fn drain<H: FileHandler>(
        &mut self,
        listing: &DirListing,
        token: &CancellationToken,
        kind: ArrivalKind,
        handler: &mut H,
    ) -> usize {
        let files = match listing.collect_files() {
            Ok(files) => files,
            Err(e) => {
                warn!(error = %e, inbox = %listing.dir(), "inbox listing failed");
                return 0;
            }
        };

        let mut handled = 0;
        for path in files {
            if token.is_cancelled() {
                break;
            }
            if self.dispatch(FileEvent::new(path, kind), handler).await {
                handled += 1;
            }
        }
        handled
    }
}

/// Subscribes to OS events for `inbox`.
fn subscribe<F: FileFilter>(inbox: &Utf8Path, filter: Arc<F>) -> Result<Source, WatchError> {
    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_CAPACITY);

    let mut watcher = notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
        match result {
            Ok(event) => forward(event, filter.as_ref(), &tx),
            Err(e) => warn!(error = %e, "file event error"),
        }
    })?;
    watcher.watch(inbox.as_std_path(), RecursiveMode::NonRecursive)?;

    Ok(Source::Events {
        _watcher: watcher,
        rx,
    })
}

/// Maps a notify event kind to an arrival, if it is one.
fn arrival_kind(kind: &EventKind) -> Option<ArrivalKind> {
    match kind {
        EventKind::Create(CreateKind::Folder)
        | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => None,
        EventKind::Create(_) => Some(ArrivalKind::Created),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ArrivalKind::MovedIn),
        _ => None,
    }
}

/// Runs on the notify thread.
fn forward<F: FileFilter>(event: notify::Event, filter: &F, tx: &mpsc::Sender<FileEvent>) {
    let Some(kind) = arrival_kind(&event.kind) else {
        return;
    };

    // A paired rename lists the source first and the destination last.
    let skip = match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => event.paths.len().saturating_sub(1),
        _ => 0,
    };

    for path in event.paths.into_iter().skip(skip) {
        let path = match Utf8PathBuf::from_path_buf(path) {
            Ok(path) => path,
            Err(path) => {
                let err = WatchError::non_utf8_path(path);
                warn!(error = %err, "skipping file event");
                continue;
            }
        };

        if path.is_dir() || !filter.should_process(&path) {
            continue;
        }

        trace!(path = %path, ?kind, "file arrived");
        if tx.blocking_send(FileEvent::new(path, kind)).is_err() {
            debug!("event receiver dropped");
            return;
        }
    }
}
