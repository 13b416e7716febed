//! Error types for mirror-remote

use std::path::PathBuf;

/// Result type for mirror-remote operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a remote host or download source
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Credentials were rejected, or a session is missing or expired
    #[error("Authentication rejected by {host}: {message}")]
    Auth { host: String, message: String },

    /// A download or upload failed at the network or host level
    #[error("Transfer failed for {target}: {message}")]
    Transfer { target: String, message: String },

    /// The referenced remote file does not exist (any more)
    #[error("Remote file not found: {name}")]
    NotFound { name: String },

    /// The host answered with something we cannot interpret
    #[error("Unexpected response from {host}: {message}")]
    Protocol { host: String, message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Filesystem error: {0}")]
    Fs(#[from] mirror_fs::Error),

    #[error("Unknown remote host kind: {kind}")]
    UnknownHostKind { kind: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn transfer(target: impl Into<String>, message: impl ToString) -> Self {
        Self::Transfer {
            target: target.into(),
            message: message.to_string(),
        }
    }

    pub fn protocol(host: impl Into<String>, message: impl ToString) -> Self {
        Self::Protocol {
            host: host.into(),
            message: message.to_string(),
        }
    }

    /// True when the error means "the file is already gone"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}
