//! Error taxonomy for granola-sync.
//!
//! Every failure a command can surface maps onto one of these kinds. Each kind
//! knows its process exit code and, where one exists, a remediation hint for
//! the user.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the library layer.
#[derive(Debug, Error)]
pub enum GranolaError {
    /// Auth file absent, unreadable, or without an access token
    #[error("Granola auth not found at {}: {reason}", path.display())]
    AuthMissing { path: PathBuf, reason: String },

    /// Token is older than its freshness window
    #[error("Granola token expired {minutes_ago} minutes ago")]
    AuthExpired { minutes_ago: i64 },

    /// The server refused the token
    #[error("Granola API rejected the token (HTTP {status})")]
    AuthRejected { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cannot write {}", path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, GranolaError>;

impl GranolaError {
    /// Wrap an I/O error that happened while writing `path`.
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StorageWrite {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this kind of failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidArgument(_) => 2,
            Self::AuthMissing { .. } | Self::AuthExpired { .. } | Self::AuthRejected { .. } => 3,
            Self::Network(_) => 4,
            Self::NotFound(_) => 5,
            Self::StorageWrite { .. } => 6,
            Self::Config(_) => 7,
        }
    }

    /// What the user can do about it.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::AuthMissing { .. } => Some(
                "Make sure Granola (https://granola.ai) is installed and you're signed in.",
            ),
            Self::AuthExpired { .. } | Self::AuthRejected { .. } => {
                Some("Open the Granola desktop app to refresh your session, then re-run.")
            }
            Self::Network(_) => Some("Check your connection and re-run the command."),
            Self::StorageWrite { .. } => {
                Some("Check that the storage folder is writable and has free space.")
            }
            Self::Config(_) => Some(
                "Check --storage, GRANOLA_SYNC_FOLDER and ~/.config/granola/config.json.",
            ),
            Self::NotFound(_) | Self::InvalidArgument(_) => None,
        }
    }

    /// Message followed by its source chain, for places that only keep text.
    pub fn full_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        message
    }

    /// Whether retrying other requests with the same token is pointless.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::AuthMissing { .. } | Self::AuthExpired { .. } | Self::AuthRejected { .. }
        )
    }
}
