//! The ban list actor.
//!
//! One task owns the list of banned identifiers. Queries, reloads,
//! subscriptions and watcher signals are all processed by that task, one at a
//! time, so the list needs no lock and no query ever sees a half-replaced list.
//!
//! ## Module Structure
//!
//! - `actor` - BanlistActor and its event loop (owns the list)
//! - `handle` - BanlistHandle (cheap-to-clone interface for callers)
//! - `command` - BanlistCommand enum (messages accepted by the actor)
//! - `context` - reload events and subscriptions

mod actor;
mod command;
pub mod context;
mod handle;

pub use actor::{ActorPhase, BanlistActor};
pub use command::BanlistCommand;
pub use context::{ReloadEvent, ReloadSubscription, ReloadTrigger, SubscriptionId};
pub use handle::BanlistHandle;
