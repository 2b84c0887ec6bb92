use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NvsError>;

#[derive(Error, Debug)]
pub enum NvsError {
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Failed to parse response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Version '{0}' not found")]
    NotFound(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Archive entry '{entry}' escapes extraction root {}", root.display())]
    PathTraversal { entry: String, root: PathBuf },

    #[error("Node.js {0} is not installed")]
    NotInstalled(String),

    #[error("'{0}' is not a valid version name")]
    InvalidKey(String),

    #[error("Node.js {key} at {} has no usable binaries directory", path.display())]
    InvalidInstallation { key: String, path: PathBuf },

    #[error("Failed to read archive {}: {reason}", path.display())]
    Archive { path: PathBuf, reason: String },

    #[error("Invalid settings in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Download of {0} was cancelled")]
    Cancelled(String),

    #[error("Failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl NvsError {
    pub fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn fetch(url: &str, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Only network failures are worth retrying; everything else is deterministic.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}

/// Attaches an action and path to a bare `io::Result`.
pub(crate) trait IoContext<T> {
    fn at(self, action: &'static str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, action: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| NvsError::io(action, path, source))
    }
}
