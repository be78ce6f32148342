//! BanlistActor - the single owner of the banned identifier list

use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{BanlistConfig, ReloadFailurePolicy};
use crate::errors::{BanlistError, Result};
use crate::store::read_banfile;
use crate::watcher::{ChangeWatcher, WatchSignal};

use super::command::BanlistCommand;
use super::context::{ReloadEvent, ReloadTrigger, SubscriptionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorPhase {
    /// Loading the banfile for the first time; no queries are answered yet
    Initializing,
    /// Serving queries and watching the banfile
    Running,
    /// Loop has exited; queued and future requests fail with `Unavailable`
    Stopped,
}

pub struct BanlistActor {
    banfile: PathBuf,
    banned: Vec<String>,
    subscribers: HashMap<SubscriptionId, oneshot::Sender<ReloadEvent>>,
    next_subscription: u64,
    reload_failure: ReloadFailurePolicy,
    phase: ActorPhase,
    cancel: CancellationToken,
    rx: mpsc::Receiver<BanlistCommand>,
}

impl BanlistActor {
    pub(crate) fn new(
        config: &BanlistConfig,
        cancel: CancellationToken,
        rx: mpsc::Receiver<BanlistCommand>,
    ) -> Self {
        Self {
            banfile: config.banfile.clone(),
            banned: Vec::new(),
            subscribers: HashMap::new(),
            next_subscription: 0,
            reload_failure: config.reload_failure,
            phase: ActorPhase::Initializing,
            cancel,
            rx,
        }
    }

    pub fn phase(&self) -> ActorPhase {
        self.phase
    }

    /// Linear scan for an exact match
    pub fn is_banned(&self, identifier: &str) -> bool {
        self.banned.iter().any(|banned| banned == identifier)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Re-read the banfile, replace the list and notify every subscriber.
    ///
    /// On failure the current list and the subscribers are left untouched.
    pub fn reload(&mut self, trigger: ReloadTrigger) -> Result<ReloadEvent> {
        let banned = read_banfile(&self.banfile).inspect_err(|e| {
            error!("Error getting list of banned identifiers: {}", e);
        })?;

        self.banned = banned;
        let event = ReloadEvent::new(trigger, self.banned.len());
        debug!(
            "Banlist reloaded ({}): {} entries from {:?}",
            trigger, event.entries, self.banfile
        );

        for (id, notify) in self.subscribers.drain() {
            if notify.send(event.clone()).is_err() {
                debug!("Reload subscriber {} went away before being notified", id);
            }
        }

        Ok(event)
    }

    pub(super) fn subscribe(&mut self, notify: oneshot::Sender<ReloadEvent>) -> SubscriptionId {
        // Drop registrations whose receiver is already gone
        self.subscribers.retain(|_, tx| !tx.is_closed());

        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.insert(id, notify);
        id
    }

    /// Run the actor until cancellation or a fatal error.
    ///
    /// `ready` receives the result of the initial load.
    pub async fn run(mut self, ready: oneshot::Sender<Result<ReloadEvent>>) -> Result<()> {
        info!("Starting monitor for banned identifiers in {:?}", self.banfile);

        let result = self.run_loop(ready).await;
        self.shutdown();

        match &result {
            Ok(()) => info!("Shutting down monitor for banned identifiers"),
            Err(e) => error!("Monitor for banned identifiers stopped: {}", e),
        }
        result
    }

    async fn run_loop(&mut self, ready: oneshot::Sender<Result<ReloadEvent>>) -> Result<()> {
        let initial = match self.reload(ReloadTrigger::Startup) {
            Ok(event) => event,
            Err(e) => {
                error!("Error loading initial list of banned identifiers: {}", e);
                let _ = ready.send(Err(e.clone()));
                return Err(e);
            }
        };

        let mut watcher = match ChangeWatcher::watch(&self.banfile) {
            Ok(watcher) => watcher,
            Err(e) => {
                error!("Error monitoring banfile {:?}: {}", self.banfile, e);
                let _ = ready.send(Err(e.clone()));
                return Err(e);
            }
        };

        self.phase = ActorPhase::Running;
        if ready.send(Ok(initial)).is_err() {
            debug!("Nobody waiting for initial load result");
        }

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("Cancellation requested, shutting down");
                    return Ok(());
                }
                cmd = self.rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd)?,
                    None => {
                        debug!("All ban list handles dropped, shutting down");
                        return Ok(());
                    }
                },
                signal = watcher.next() => self.handle_watch_signal(signal)?,
            }
        }
    }

    pub(super) fn handle_command(&mut self, cmd: BanlistCommand) -> Result<()> {
        match cmd {
            BanlistCommand::IsBanned { identifier, reply } => {
                let banned = self.is_banned(&identifier);
                debug!("Checked {}: banned={}", identifier, banned);
                let _ = reply.send(banned);
            }
            BanlistCommand::Entries { reply } => {
                let _ = reply.send(self.banned.clone());
            }
            BanlistCommand::Reload { reply } => match self.reload(ReloadTrigger::Explicit) {
                Ok(event) => {
                    let _ = reply.send(Ok(event));
                }
                Err(e) => {
                    error!("Error when explicitly reloading list of banned identifiers: {}", e);
                    let _ = reply.send(Err(e.clone()));
                    self.on_reload_failure(e)?;
                }
            },
            BanlistCommand::Subscribe { notify, reply } => {
                let id = self.subscribe(notify);
                debug!("Registered reload subscriber {}", id);
                let _ = reply.send(id);
            }
        }
        Ok(())
    }

    pub(super) fn handle_watch_signal(&mut self, signal: WatchSignal) -> Result<()> {
        match signal {
            WatchSignal::BanfileChanged(kind) => {
                debug!("Banfile has changed ({:?}), reloading banned identifiers", kind);
                if let Err(e) = self.reload(ReloadTrigger::FileChange) {
                    error!("Error reloading banned identifiers after file change: {}", e);
                    self.on_reload_failure(e)?;
                }
                Ok(())
            }
            WatchSignal::Error(e) => {
                error!("Error from file watcher: {}", e);
                Ok(())
            }
            WatchSignal::Closed(what) => {
                error!("Watcher {} unexpectedly, stopping monitor", what);
                Err(BanlistError::Watch(what.to_string()))
            }
        }
    }

    fn on_reload_failure(&self, e: BanlistError) -> Result<()> {
        match self.reload_failure {
            ReloadFailurePolicy::KeepLastGood => {
                warn!(
                    "Keeping last good list of {} banned identifiers",
                    self.banned.len()
                );
                Ok(())
            }
            ReloadFailurePolicy::Terminate => Err(e),
        }
    }

    /// Refuse new requests and drop queued ones so their callers resolve
    /// to `Unavailable` instead of waiting forever.
    fn shutdown(&mut self) {
        self.phase = ActorPhase::Stopped;
        self.rx.close();

        let mut dropped = 0usize;
        while let Ok(cmd) = self.rx.try_recv() {
            debug!("Dropping queued {} request", cmd.name());
            dropped += 1;
        }
        if dropped > 0 {
            warn!("Dropped {} queued ban list requests during shutdown", dropped);
        }

        if !self.subscribers.is_empty() {
            debug!("Releasing {} pending reload subscribers", self.subscribers.len());
            self.subscribers.clear();
        }
    }
}
