//! Error types for mirror-core

use std::path::PathBuf;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A string is not a `major.minor.patch` triple
    #[error("Invalid version '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// The persisted state exists but does not hold a version
    #[error("State file {path} does not hold a version: {content:?}")]
    InvalidState { path: PathBuf, content: String },

    /// The upstream advertised no conforming release tag
    #[error("No release tag of the form major.minor.patch found at {location}")]
    UnknownUpstreamVersion { location: String },

    /// A sync needs to authenticate but no credentials were supplied
    #[error("Credentials are required to replace remote files")]
    MissingCredentials,

    /// Configuration is present but unusable
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),

    /// Git error from mirror-git
    #[error(transparent)]
    Git(#[from] mirror_git::Error),

    /// Remote host or download error from mirror-remote
    #[error(transparent)]
    Remote(#[from] mirror_remote::Error),
}

impl Error {
    /// True for rejected or missing credentials
    pub fn is_auth(&self) -> bool {
        match self {
            Self::Remote(e) => e.is_auth(),
            Self::MissingCredentials => true,
            _ => false,
        }
    }

    /// True for failed downloads and uploads
    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::Remote(mirror_remote::Error::Transfer { .. }))
    }
}
