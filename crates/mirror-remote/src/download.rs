//! Download capability: fetch a URL into a local file

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::{Error, Result};

/// Fetches remote content to a local path.
///
/// Implementations must be all-or-nothing: on failure no partial file is
/// left at `destination`.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str, destination: &Path) -> Result<()>;
}

/// [`Downloader`] over plain HTTP(S) GET.
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("release-mirror/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::protocol("http", e))?;
        Ok(Self { client })
    }

    async fn fetch_into(&self, url: &str, part: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transfer(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transfer(url, format!("HTTP {status}")));
        }

        let mut file = tokio::fs::File::create(part)
            .await
            .map_err(|e| Error::io(part, e))?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(|e| Error::transfer(url, e))? {
            file.write_all(&chunk).await.map_err(|e| Error::io(part, e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| Error::io(part, e))?;
        file.sync_all().await.map_err(|e| Error::io(part, e))?;
        Ok(written)
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, destination: &Path) -> Result<()> {
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }

        let part = part_path(destination);
        tracing::debug!(url, part = %part.display(), "Downloading");

        let bytes = match self.fetch_into(url, &part).await {
            Ok(bytes) => bytes,
            Err(e) => {
                discard_part(&part);
                return Err(e);
            }
        };
        promote_part(&part, destination).await?;
        tracing::debug!(url, bytes, "Download complete");
        Ok(())
    }
}

/// Move a finished part file into place. The part file never outlives a
/// failed rename.
async fn promote_part(part: &Path, destination: &Path) -> Result<()> {
    if let Err(e) = tokio::fs::rename(part, destination).await {
        discard_part(part);
        return Err(Error::io(destination, e));
    }
    Ok(())
}

fn discard_part(part: &Path) {
    if let Err(cleanup) = mirror_fs::io::remove_file_if_exists(part) {
        tracing::warn!(part = %part.display(), error = %cleanup, "Failed to remove partial download");
    }
}

/// Sibling `.{name}.part` file the download is streamed into before rename.
pub fn part_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    destination.with_file_name(format!(".{name}.part"))
}
