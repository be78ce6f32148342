//! Ban list configuration.
//!
//! Configuration comes either from a YAML file:
//!
//! ```yaml
//! banfile: /var/lib/fail2ban/banned-ips
//! query_timeout: 500ms
//! reload_failure: keep_last_good
//! ```
//!
//! or from the one-line directive form used by host integrations
//! (`fail2ban /var/lib/fail2ban/banned-ips`).

pub mod duration;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{BanlistError, Result};

pub use duration::{format_duration, parse_duration};

/// Directive keyword accepted by [`BanlistConfig::from_directive`]
pub const DIRECTIVE: &str = "fail2ban";

/// Header that marks a request as banned regardless of its address
pub const DEFAULT_BAN_HEADER: &str = "X-Caddy-Ban";

/// Default capacity of the actor command channel
pub const DEFAULT_COMMAND_BUFFER: usize = 1024;

/// What the actor does when a reload after startup fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadFailurePolicy {
    /// Log the failure and keep serving the last successfully loaded list
    #[default]
    KeepLastGood,
    /// Stop the actor; every later query fails with `Unavailable`
    Terminate,
}

fn default_command_buffer() -> usize {
    DEFAULT_COMMAND_BUFFER
}

fn default_ban_header() -> Option<String> {
    Some(DEFAULT_BAN_HEADER.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BanlistConfig {
    /// Path of the banfile, one identifier per line
    pub banfile: PathBuf,

    /// Upper bound for every call made against the actor
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "duration::deserialize_optional_duration",
        serialize_with = "duration::serialize_optional_duration"
    )]
    pub query_timeout: Option<Duration>,

    #[serde(default)]
    pub reload_failure: ReloadFailurePolicy,

    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,

    /// Request header that short-circuits the matcher; `null` disables it
    #[serde(default = "default_ban_header")]
    pub ban_header: Option<String>,
}

impl BanlistConfig {
    pub fn new(banfile: impl Into<PathBuf>) -> Self {
        Self {
            banfile: banfile.into(),
            query_timeout: None,
            reload_failure: ReloadFailurePolicy::default(),
            command_buffer: DEFAULT_COMMAND_BUFFER,
            ban_header: default_ban_header(),
        }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn with_reload_failure(mut self, policy: ReloadFailurePolicy) -> Self {
        self.reload_failure = policy;
        self
    }

    pub fn with_ban_header(mut self, header: Option<String>) -> Self {
        self.ban_header = header;
        self
    }

    /// Load and validate a YAML config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BanlistError::ConfigNotFound(path.to_path_buf())
            } else {
                BanlistError::Config(format!("Failed to read '{}': {}", path.display(), e))
            }
        })?;

        let config = Self::parse_yaml(&contents, path)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_yaml(contents: &str, path: &Path) -> Result<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(contents);
        serde_path_to_error::deserialize(deserializer).map_err(|e| BanlistError::ConfigParse {
            path: path.to_path_buf(),
            source: Arc::new(e),
        })
    }

    /// Parse the directive form: `fail2ban <path>`.
    ///
    /// Several directives may appear (whitespace separated); the last path wins.
    pub fn from_directive(text: &str) -> Result<Self> {
        let mut tokens = text.split_whitespace();
        let mut banfile = None;

        while let Some(token) = tokens.next() {
            match token {
                DIRECTIVE => {
                    let path = tokens.next().ok_or_else(|| {
                        BanlistError::Config(format!(
                            "{} expects file path, value is missing",
                            DIRECTIVE
                        ))
                    })?;
                    banfile = Some(PathBuf::from(path));
                }
                other => {
                    return Err(BanlistError::Config(format!(
                        "unknown config value: {}",
                        other
                    )))
                }
            }
        }

        let banfile = banfile.ok_or_else(|| {
            BanlistError::Config(format!("expected '{} <path>' directive", DIRECTIVE))
        })?;
        Ok(Self::new(banfile))
    }

    pub fn validate(&self) -> Result<()> {
        if self.banfile.as_os_str().is_empty() {
            return Err(BanlistError::Config("banfile must not be empty".into()));
        }
        if self.command_buffer == 0 {
            return Err(BanlistError::Config(
                "command_buffer must be greater than zero".into(),
            ));
        }
        if let Some(timeout) = self.query_timeout {
            if timeout.is_zero() {
                return Err(BanlistError::Config(
                    "query_timeout must be greater than zero".into(),
                ));
            }
        }
        if let Some(header) = &self.ban_header {
            if header.trim().is_empty() {
                return Err(BanlistError::Config(
                    "ban_header must not be blank (use null to disable)".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
