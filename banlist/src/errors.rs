use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Format a YAML error for user-friendly display, including the field path
fn format_yaml_error(e: &serde_path_to_error::Error<serde_yaml::Error>) -> String {
    let path = e.path().to_string();
    let inner = e.inner();
    let msg = inner.to_string();

    let located = if let Some(loc) = inner.location() {
        format!("Line {}, Column {}: {}", loc.line(), loc.column(), msg)
    } else {
        msg
    };

    if path.is_empty() || path == "." {
        located
    } else {
        format!("{}: {}", path, located)
    }
}

/// Errors produced by the ban list and its configuration.
///
/// Sources are held behind `Arc` so a single failure can be handed both to
/// the caller that triggered a reload and to the actor loop deciding whether
/// to keep running.
#[derive(Error, Debug, Clone)]
pub enum BanlistError {
    #[error("Cannot open or create banfile '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("Error parsing banfile '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("File watcher error: {0}")]
    Watch(String),

    #[error("Ban list is unavailable (actor not running)")]
    Unavailable,

    #[error("Ban list did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Ban list already started")]
    AlreadyStarted,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Failed to parse config file '{path}':\n  {}", format_yaml_error(.source))]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: Arc<serde_path_to_error::Error<serde_yaml::Error>>,
    },
}

impl BanlistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BanlistError::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BanlistError::Parse {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Whether this error came from reading the banfile (as opposed to the
    /// watcher, configuration or the actor channel).
    pub fn is_banfile_error(&self) -> bool {
        matches!(self, BanlistError::Io { .. } | BanlistError::Parse { .. })
    }
}

impl From<notify::Error> for BanlistError {
    fn from(e: notify::Error) -> Self {
        BanlistError::Watch(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BanlistError>;
