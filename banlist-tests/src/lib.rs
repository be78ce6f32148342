//! Test utilities for the banlist workspace
//!
//! Helpers for creating banfiles in temporary directories, editing them the
//! way external tools do, and waiting for the ban list to pick changes up.

pub mod helpers;

pub use helpers::banfile::TestBanfile;
pub use helpers::wait_utils::{wait_for_reload, wait_until_banned, WaitError};
