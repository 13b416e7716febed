//! Artifact retrieval into scratch storage
//!
//! Layout under the scratch directory:
//!
//! ```text
//! {scratch}/{version}/{local_file_name}            downloaded archive
//! {scratch}/{version}/outgoing/{remote_file_name}  upload staging link
//! ```

use std::path::{Path, PathBuf};

use mirror_fs::io;
use mirror_remote::Downloader;

use crate::{Artifact, Result, Version};

pub struct ArtifactFetcher {
    downloader: Box<dyn Downloader>,
    scratch: PathBuf,
}

impl ArtifactFetcher {
    pub fn new(downloader: Box<dyn Downloader>, scratch: impl Into<PathBuf>) -> Self {
        Self {
            downloader,
            scratch: scratch.into(),
        }
    }

    pub fn version_dir(&self, version: Version) -> PathBuf {
        self.scratch.join(version.to_string())
    }

    pub fn destination(&self, artifact: &Artifact) -> PathBuf {
        self.version_dir(artifact.version)
            .join(&artifact.local_file_name)
    }

    /// Download `artifact` and return its local path.
    ///
    /// A stale file at the destination is removed first. On failure no file
    /// is left at the destination.
    pub async fn fetch(&self, artifact: &Artifact) -> Result<PathBuf> {
        let destination = self.destination(artifact);
        if io::remove_file_if_exists(&destination)? {
            tracing::debug!(path = %destination.display(), "Removed stale artifact");
        }

        if let Err(e) = self
            .downloader
            .download(&artifact.source_url, &destination)
            .await
        {
            if let Err(cleanup) = io::remove_file_if_exists(&destination) {
                tracing::warn!(path = %destination.display(), error = %cleanup, "Failed to remove incomplete artifact");
            }
            return Err(e.into());
        }

        tracing::info!(platform = %artifact.platform, path = %destination.display(), "Fetched artifact");
        Ok(destination)
    }

    /// Expose a fetched file under the artifact's remote name, so an upload
    /// of the returned path lands as `remote_file_name`.
    pub fn stage_for_upload(&self, artifact: &Artifact, local: &Path) -> Result<PathBuf> {
        let staged = self
            .version_dir(artifact.version)
            .join("outgoing")
            .join(&artifact.remote_file_name);
        io::link_or_copy(local, &staged)?;
        Ok(staged)
    }

    /// Remove the scratch directory of `version`. Returns whether it existed.
    pub fn clean(&self, version: Version) -> Result<bool> {
        Ok(io::remove_dir_if_exists(&self.version_dir(version))?)
    }
}
