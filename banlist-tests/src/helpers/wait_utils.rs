//! Async utilities to wait for reloads

use banlist::{BanlistError, BanlistHandle, ReloadEvent, ReloadSubscription};
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// Error type for wait operations
#[derive(Debug)]
pub enum WaitError {
    Timeout,
    Banlist(BanlistError),
}

impl std::fmt::Display for WaitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitError::Timeout => write!(f, "Wait operation timed out"),
            WaitError::Banlist(e) => write!(f, "Ban list error: {}", e),
        }
    }
}

impl std::error::Error for WaitError {}

impl From<BanlistError> for WaitError {
    fn from(e: BanlistError) -> Self {
        WaitError::Banlist(e)
    }
}

/// Wait for a subscription to fire
pub async fn wait_for_reload(
    subscription: ReloadSubscription,
    limit: Duration,
) -> Result<ReloadEvent, WaitError> {
    timeout(limit, subscription.wait())
        .await
        .map_err(|_| WaitError::Timeout)?
        .map_err(WaitError::from)
}

/// Wait until `is_banned(identifier)` answers `expected`.
///
/// A single external edit may surface as several watcher events (truncate,
/// then write), so this keeps re-subscribing and re-checking until the
/// answer settles or the deadline passes.
pub async fn wait_until_banned(
    handle: &BanlistHandle,
    identifier: &str,
    expected: bool,
    limit: Duration,
) -> Result<(), WaitError> {
    let deadline = Instant::now() + limit;
    loop {
        // Subscribe before checking so a reload in between is not missed
        let subscription = handle.subscribe_to_reload().await?;
        if handle.is_banned(identifier).await? == expected {
            return Ok(());
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(WaitError::Timeout);
        }
        wait_for_reload(subscription, remaining).await?;
    }
}
