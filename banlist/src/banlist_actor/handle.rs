//! BanlistHandle - handle for communicating with BanlistActor
//!
//! Cheap to clone; every clone talks to the same actor. Each call waits only
//! for its own answer, so concurrent callers never block one another.

use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::errors::{BanlistError, Result};

use super::command::BanlistCommand;
use super::context::{ReloadEvent, ReloadSubscription};

#[derive(Clone)]
pub struct BanlistHandle {
    tx: mpsc::Sender<BanlistCommand>,
    timeout: Option<Duration>,
    runtime: Arc<OnceLock<Handle>>,
}

impl BanlistHandle {
    pub(crate) fn new(tx: mpsc::Sender<BanlistCommand>, timeout: Option<Duration>) -> Self {
        let runtime = Arc::new(OnceLock::new());
        if let Ok(current) = Handle::try_current() {
            let _ = runtime.set(current);
        }
        Self {
            tx,
            timeout,
            runtime,
        }
    }

    /// Remember the runtime used by the blocking calls (first one wins)
    pub(crate) fn bind_runtime(&self, runtime: Handle) {
        let _ = self.runtime.set(runtime);
    }

    /// Whether the actor has stopped accepting requests
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> BanlistCommand,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let cmd = build(reply_tx);
        let name = cmd.name();

        let exchange = async {
            self.tx.send(cmd).await.map_err(|_| {
                warn!("Ban list actor closed, cannot send {}", name);
                BanlistError::Unavailable
            })?;
            reply_rx.await.map_err(|_| {
                warn!("Ban list actor dropped {} response", name);
                BanlistError::Unavailable
            })
        };

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange).await.map_err(|_| {
                warn!("Ban list {} request timed out after {:?}", name, limit);
                BanlistError::Timeout(limit)
            })?,
            None => exchange.await,
        }
    }

    // === Query Methods ===

    /// Whether `identifier` exactly matches a line of the banfile
    pub async fn is_banned(&self, identifier: &str) -> Result<bool> {
        self.request(|reply| BanlistCommand::IsBanned {
            identifier: identifier.to_string(),
            reply,
        })
        .await
    }

    /// Snapshot of the current list, in file order
    pub async fn entries(&self) -> Result<Vec<String>> {
        self.request(|reply| BanlistCommand::Entries { reply }).await
    }

    // === Mutation Methods ===

    /// Re-read the banfile and wait until the new list is live
    pub async fn reload(&self) -> Result<ReloadEvent> {
        self.request(|reply| BanlistCommand::Reload { reply }).await?
    }

    /// Register for the next successful reload.
    ///
    /// Registration is acknowledged by the actor before this returns, so any
    /// reload triggered afterwards is guaranteed to notify the subscription.
    pub async fn subscribe_to_reload(&self) -> Result<ReloadSubscription> {
        let (notify, rx) = oneshot::channel();
        let id = self
            .request(|reply| BanlistCommand::Subscribe { notify, reply })
            .await?;
        Ok(ReloadSubscription::new(id, rx))
    }

    // === Blocking Methods ===

    /// Blocking form of [`BanlistHandle::is_banned`] for plain OS threads
    /// and `spawn_blocking` closures.
    ///
    /// # Panics
    ///
    /// Panics when called from inside an async task (a runtime worker
    /// thread), since blocking there would stall the runtime. Use the async
    /// method instead.
    pub fn blocking_is_banned(&self, identifier: &str) -> Result<bool> {
        self.block_on(self.is_banned(identifier))?
    }

    /// Blocking form of [`BanlistHandle::reload`].
    ///
    /// # Panics
    ///
    /// Panics when called from inside an async task.
    pub fn blocking_reload(&self) -> Result<ReloadEvent> {
        self.block_on(self.reload())?
    }

    /// Blocking form of [`BanlistHandle::entries`].
    ///
    /// # Panics
    ///
    /// Panics when called from inside an async task.
    pub fn blocking_entries(&self) -> Result<Vec<String>> {
        self.block_on(self.entries())?
    }

    /// Fails with `Internal` when no runtime is bound or ambient
    fn block_on<F: Future>(&self, fut: F) -> Result<F::Output> {
        let runtime = self
            .runtime
            .get()
            .cloned()
            .or_else(|| Handle::try_current().ok())
            .ok_or_else(|| {
                BanlistError::Internal("no tokio runtime bound to ban list handle".into())
            })?;
        Ok(runtime.block_on(fut))
    }
}
