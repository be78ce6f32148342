//! Reload events and one-shot reload subscriptions

use chrono::{DateTime, Utc};
use std::fmt;
use tokio::sync::oneshot;

use crate::errors::{BanlistError, Result};

/// What caused a reload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadTrigger {
    /// Initial load while the actor starts
    Startup,
    /// A caller asked for it through the handle
    Explicit,
    /// The watcher saw the banfile change
    FileChange,
}

impl ReloadTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReloadTrigger::Startup => "startup",
            ReloadTrigger::Explicit => "explicit",
            ReloadTrigger::FileChange => "file_change",
        }
    }
}

impl fmt::Display for ReloadTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivered after a successful reload, once the new list is live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadEvent {
    pub trigger: ReloadTrigger,
    /// Number of lines in the new list (duplicates included)
    pub entries: usize,
    pub reloaded_at: DateTime<Utc>,
}

impl ReloadEvent {
    pub fn new(trigger: ReloadTrigger, entries: usize) -> Self {
        Self {
            trigger,
            entries,
            reloaded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// One-shot notification for the next successful reload.
///
/// Consumed by [`ReloadSubscription::wait`]; observing several reloads means
/// subscribing again before each one.
#[derive(Debug)]
pub struct ReloadSubscription {
    id: SubscriptionId,
    rx: oneshot::Receiver<ReloadEvent>,
}

impl ReloadSubscription {
    pub(crate) fn new(id: SubscriptionId, rx: oneshot::Receiver<ReloadEvent>) -> Self {
        Self { id, rx }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Wait for the reload. Fails with `Unavailable` if the actor stops first.
    pub async fn wait(self) -> Result<ReloadEvent> {
        self.rx.await.map_err(|_| BanlistError::Unavailable)
    }

    /// Non-blocking check; `Ok(None)` while no reload has happened yet
    pub fn try_recv(&mut self) -> Result<Option<ReloadEvent>> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(oneshot::error::TryRecvError::Empty) => Ok(None),
            Err(oneshot::error::TryRecvError::Closed) => Err(BanlistError::Unavailable),
        }
    }
}
