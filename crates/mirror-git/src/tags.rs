//! Reference listing for upstream repositories

use git2::{Direction, Remote};

use crate::{Error, Result};

/// Source of reference names for an upstream repository.
///
/// Implementations return every advertised reference name verbatim
/// (e.g. `refs/tags/3.7.12`, `refs/tags/3.7.12^{}`, `refs/heads/main`);
/// filtering is the caller's job.
pub trait TagSource: Send + Sync {
    /// Human-readable location used in status lines and errors
    fn location(&self) -> &str;

    /// List the advertised reference names
    fn list_refs(&self) -> Result<Vec<String>>;
}

/// Lists references of a remote repository over the git protocol.
///
/// Only the reference advertisement is fetched; no objects are
/// downloaded and nothing is written to disk.
#[derive(Debug, Clone)]
pub struct RemoteTagSource {
    url: String,
}

impl RemoteTagSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl TagSource for RemoteTagSource {
    fn location(&self) -> &str {
        &self.url
    }

    fn list_refs(&self) -> Result<Vec<String>> {
        let list_failed = |e: git2::Error| Error::ListRefsFailed {
            url: self.url.clone(),
            message: e.message().to_string(),
        };

        let mut remote = Remote::create_detached(self.url.as_str()).map_err(list_failed)?;
        remote.connect(Direction::Fetch).map_err(list_failed)?;

        let names: Vec<String> = remote
            .list()
            .map_err(list_failed)?
            .iter()
            .map(|head| head.name().to_string())
            .collect();

        if let Err(e) = remote.disconnect() {
            tracing::debug!(url = %self.url, error = %e, "Disconnect after listing failed");
        }

        tracing::debug!(url = %self.url, count = names.len(), "Listed remote references");
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_refs_invalid_location_fails() {
        let source = RemoteTagSource::new("/definitely/not/a/repository");
        let result = source.list_refs();
        assert!(matches!(result, Err(Error::ListRefsFailed { .. })));
    }

    #[test]
    fn test_location_is_url() {
        let source = RemoteTagSource::new("https://github.com/flutter/flutter.git");
        assert_eq!(source.location(), "https://github.com/flutter/flutter.git");
    }
}
