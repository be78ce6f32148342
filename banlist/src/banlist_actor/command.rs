use tokio::sync::oneshot;

use crate::errors::Result;

use super::context::{ReloadEvent, SubscriptionId};

/// Messages accepted by the ban list actor
pub enum BanlistCommand {
    // === Query Commands ===
    IsBanned {
        identifier: String,
        reply: oneshot::Sender<bool>,
    },
    Entries {
        reply: oneshot::Sender<Vec<String>>,
    },

    // === Mutation Commands ===
    Reload {
        reply: oneshot::Sender<Result<ReloadEvent>>,
    },

    // === Subscription Commands ===
    /// Register `notify` for the next successful reload; `reply` acknowledges
    /// the registration so later events are guaranteed to be seen.
    Subscribe {
        notify: oneshot::Sender<ReloadEvent>,
        reply: oneshot::Sender<SubscriptionId>,
    },
}

impl BanlistCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BanlistCommand::IsBanned { .. } => "IsBanned",
            BanlistCommand::Entries { .. } => "Entries",
            BanlistCommand::Reload { .. } => "Reload",
            BanlistCommand::Subscribe { .. } => "Subscribe",
        }
    }
}
