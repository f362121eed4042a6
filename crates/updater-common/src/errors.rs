// Error taxonomy for the update cycle.
// Every variant aborts the current cycle and leaves durable state untouched;
// none of them are fatal to the runner process, the next trigger retries.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while checking for, downloading, and installing an update.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The version feed was unreachable or returned a malformed body.
    #[error("version feed unavailable: {reason}")]
    Feed { reason: String },

    /// Fetching the artifact or writing it to disk failed.
    #[error("artifact download from '{url}' failed: {reason}")]
    Download { url: String, reason: String },

    /// The artifact expected on disk was absent when starting the client.
    #[error("client artifact not found: {}", path.display())]
    ArtifactMissing { path: PathBuf },

    /// Spawning the client process failed.
    #[error("failed to start client process from '{}': {reason}", path.display())]
    ProcessStart { path: PathBuf, reason: String },

    /// Reading or writing the persisted version record failed.
    #[error("version store I/O failed at '{}': {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required configuration value was missing or empty.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl UpdateError {
    /// Shorthand for a feed failure with a formatted reason.
    pub fn feed(reason: impl Into<String>) -> Self {
        UpdateError::Feed {
            reason: reason.into(),
        }
    }

    /// Shorthand for a download failure against a specific URL.
    pub fn download(url: impl Into<String>, reason: impl Into<String>) -> Self {
        UpdateError::Download {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a storage failure at a specific path.
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UpdateError::Storage {
            path: path.into(),
            source,
        }
    }
}
