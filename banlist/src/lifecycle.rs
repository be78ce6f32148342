//! Start/stop wrapper around the ban list actor.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::banlist_actor::{BanlistActor, BanlistHandle, ReloadEvent};
use crate::config::BanlistConfig;
use crate::errors::{BanlistError, Result};

/// A ban list bound to one banfile.
///
/// Handles can be taken before [`Banlist::start`]; requests sent through them
/// queue until the initial load has finished.
pub struct Banlist {
    config: BanlistConfig,
    cancel: CancellationToken,
    handle: BanlistHandle,
    actor: Option<BanlistActor>,
    task: Option<JoinHandle<Result<()>>>,
}

impl Banlist {
    /// Create the ban list. Cancelling `parent` shuts it down.
    pub fn new(config: BanlistConfig, parent: &CancellationToken) -> Self {
        let cancel = parent.child_token();
        let (tx, rx) = mpsc::channel(config.command_buffer.max(1));
        let handle = BanlistHandle::new(tx, config.query_timeout);
        let actor = BanlistActor::new(&config, cancel.clone(), rx);

        Self {
            config,
            cancel,
            handle,
            actor: Some(actor),
            task: None,
        }
    }

    pub fn config(&self) -> &BanlistConfig {
        &self.config
    }

    pub fn handle(&self) -> BanlistHandle {
        self.handle.clone()
    }

    /// Whether the actor task is alive
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Spawn the actor and wait for the initial load of the banfile.
    ///
    /// An initial load failure is returned here and the actor never serves.
    /// A ban list that was already stopped (or whose parent token was
    /// cancelled) cannot be started and returns `Unavailable`.
    pub async fn start(&mut self) -> Result<ReloadEvent> {
        self.config.validate()?;
        if self.cancel.is_cancelled() {
            // Release queued callers of a never-started actor
            self.actor.take();
            return Err(BanlistError::Unavailable);
        }
        let actor = self.actor.take().ok_or(BanlistError::AlreadyStarted)?;

        self.handle.bind_runtime(tokio::runtime::Handle::current());

        let (ready_tx, ready_rx) = oneshot::channel();
        self.task = Some(tokio::spawn(actor.run(ready_tx)));

        let initial = ready_rx.await.map_err(|_| BanlistError::Unavailable)??;
        info!(
            "Ban list started with {} entries from {:?}",
            initial.entries, self.config.banfile
        );
        Ok(initial)
    }

    /// Stop the actor and wait for it to exit. Safe to call more than once.
    pub async fn stop(&mut self) {
        self.cancel.cancel();

        // Never started: dropping the actor closes its channel so queued and
        // future requests fail with `Unavailable`
        if self.actor.take().is_some() {
            debug!("Ban list stopped before it was started");
        }

        let Some(task) = self.task.take() else {
            return;
        };
        match task.await {
            Ok(Ok(())) => debug!("Ban list actor stopped"),
            Ok(Err(e)) => debug!("Ban list actor had already stopped: {}", e),
            Err(e) => error!("Ban list actor task failed: {}", e),
        }
    }
}

impl Drop for Banlist {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
