//! Live, file-backed ban list.
//!
//! A single actor task owns the list of banned identifiers read from a
//! banfile (one identifier per line), answers membership queries, and reloads
//! the list whenever the file changes on disk or a caller asks for it.

pub mod banlist_actor;
pub mod config;
pub mod errors;
pub mod lifecycle;
pub mod matcher;
pub mod store;
pub mod watcher;

pub use banlist_actor::{BanlistHandle, ReloadEvent, ReloadSubscription, ReloadTrigger};
pub use config::{BanlistConfig, ReloadFailurePolicy};
pub use errors::{BanlistError, Result};
pub use lifecycle::Banlist;
pub use matcher::{BanMatcher, MatchRequest, RequestInfo};
