//! Upstream version discovery

use mirror_git::TagSource;

use crate::{Result, Version};

/// Reference namespace release tags are advertised under
pub const DEFAULT_TAG_PREFIX: &str = "refs/tags/";

/// Finds the version to mirror, from caller input or the upstream tags.
pub struct VersionResolver {
    source: Box<dyn TagSource>,
    prefix: String,
}

impl VersionResolver {
    pub fn new(source: Box<dyn TagSource>) -> Self {
        Self {
            source,
            prefix: DEFAULT_TAG_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Where tags are listed from
    pub fn location(&self) -> &str {
        self.source.location()
    }

    /// Highest conforming tag of the upstream, or [`Version::ZERO`] when
    /// none conforms. Listing failures are returned as errors.
    pub fn resolve_latest(&self) -> Result<Version> {
        let refs = self.source.list_refs()?;
        let latest = latest_from_refs(&refs, &self.prefix);
        tracing::debug!(
            location = %self.location(),
            refs = refs.len(),
            %latest,
            "Resolved upstream version"
        );
        Ok(latest)
    }

    /// Interpret caller input as a version. Anything that is not a triple
    /// means "no explicit version" rather than an error.
    pub fn resolve_from_input(input: &str) -> Option<Version> {
        Version::parse(input.trim()).ok()
    }
}

/// Maximum version among `refs` that match `{prefix}{major}.{minor}.{patch}`.
///
/// Non-conforming names (other namespaces, prereleases, peeled `^{}`
/// entries) are skipped.
pub fn latest_from_refs<S: AsRef<str>>(refs: &[S], prefix: &str) -> Version {
    refs.iter()
        .filter_map(|r| r.as_ref().strip_prefix(prefix))
        .filter_map(|name| Version::parse(name).ok())
        .max()
        .unwrap_or(Version::ZERO)
}
