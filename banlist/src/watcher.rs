//! Banfile change watcher.
//!
//! The watch is placed on the directory containing the banfile, so writes,
//! a rename over the banfile and unlink + create all show up as events.

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::{BanlistError, Result};

/// Signals relayed from the filesystem watcher to the actor
#[derive(Debug, Clone)]
pub enum WatchSignal {
    /// The banfile was written, created or renamed into place
    BanfileChanged(EventKind),
    /// The notification backend reported an error; watching continues
    Error(Arc<notify::Error>),
    /// The event or error stream ended; monitoring has stopped for good
    Closed(&'static str),
}

/// Whether `event` means the contents of `banfile` may have changed.
///
/// Only events naming the banfile itself count, and only for kinds that
/// can change what a reader sees: data writes, creation, and a rename that
/// lands on the banfile path.
pub fn is_banfile_change(event: &Event, banfile: &Path) -> bool {
    let relevant_kind = match event.kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => true,
        EventKind::Modify(ModifyKind::Name(mode)) => {
            matches!(mode, RenameMode::To | RenameMode::Both | RenameMode::Any)
        }
        _ => false,
    };
    if !relevant_kind {
        return false;
    }

    match event.kind {
        // For paired renames the destination is the last path
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.last().is_some_and(|p| p == banfile)
        }
        _ => event.paths.iter().any(|p| p == banfile),
    }
}

/// Resolve the banfile to the path the watcher backend will report.
///
/// The parent directory is canonicalized (so symlinked directories such as
/// `/tmp` on macOS compare equal) and the file name is re-attached.
pub fn resolve_watch_path(banfile: &Path) -> Result<PathBuf> {
    let file_name = banfile.file_name().ok_or_else(|| {
        BanlistError::Watch(format!("banfile {:?} has no file name", banfile))
    })?;

    let parent = match banfile.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let dir = std::fs::canonicalize(&parent).map_err(|e| {
        BanlistError::Watch(format!("cannot resolve directory {:?}: {}", parent, e))
    })?;

    Ok(dir.join(file_name))
}

/// Watches the banfile's directory and yields [`WatchSignal`]s.
///
/// Dropping the watcher stops the backend and releases its OS resources.
pub struct ChangeWatcher {
    banfile: PathBuf,
    events: mpsc::UnboundedReceiver<Event>,
    errors: mpsc::UnboundedReceiver<notify::Error>,
    _watcher: RecommendedWatcher,
}

impl ChangeWatcher {
    /// Start watching the directory that contains `banfile`
    pub fn watch(banfile: &Path) -> Result<Self> {
        let banfile = resolve_watch_path(banfile)?;
        let dir = banfile
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| BanlistError::Watch(format!("{:?} has no parent", banfile)))?;

        let (event_tx, events) = mpsc::unbounded_channel();
        let (error_tx, errors) = mpsc::unbounded_channel();

        // Runs on the backend's own thread
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let closed = match res {
                Ok(event) => event_tx.send(event).is_err(),
                Err(e) => error_tx.send(e).is_err(),
            };
            if closed {
                debug!("Watcher receiver dropped, discarding notification");
            }
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        info!("Watching {:?} for changes to {:?}", dir, banfile);

        Ok(Self {
            banfile,
            events,
            errors,
            _watcher: watcher,
        })
    }

    /// Wait for the next relevant signal.
    ///
    /// Cancel-safe: events that arrived but were not yet returned stay queued.
    pub async fn next(&mut self) -> WatchSignal {
        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => {
                        if is_banfile_change(&event, &self.banfile) {
                            return WatchSignal::BanfileChanged(event.kind);
                        }
                        debug!("Ignoring watcher event {:?} for {:?}", event.kind, event.paths);
                    }
                    None => return WatchSignal::Closed("event stream closed"),
                },
                error = self.errors.recv() => match error {
                    Some(e) => return WatchSignal::Error(Arc::new(e)),
                    None => return WatchSignal::Closed("error stream closed"),
                },
            }
        }
    }
}
