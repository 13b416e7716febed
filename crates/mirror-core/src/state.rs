//! Last mirrored version, persisted as a single plain-text value

use std::path::{Path, PathBuf};

use mirror_fs::io;

use crate::{Error, Result, Version};

pub struct SyncStateStore {
    path: PathBuf,
}

impl SyncStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when nothing was ever persisted (missing or blank file).
    pub fn read_last(&self) -> Result<Option<Version>> {
        let Some(content) = io::read_text_optional(&self.path)? else {
            return Ok(None);
        };
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        Version::parse(trimmed)
            .map(Some)
            .map_err(|_| Error::InvalidState {
                path: self.path.clone(),
                content: trimmed.to_string(),
            })
    }

    /// Replace the persisted value. Written without a trailing newline.
    pub fn write_last(&self, version: Version) -> Result<()> {
        io::write_atomic(&self.path, version.to_string().as_bytes())?;
        tracing::debug!(path = %self.path.display(), %version, "Persisted sync state");
        Ok(())
    }
}
