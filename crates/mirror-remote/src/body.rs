//! Streaming request bodies backed by local files

use std::path::Path;

use reqwest::Body;
use tokio_util::io::ReaderStream;

use crate::{Error, Result};

/// A local file opened for upload.
pub(crate) struct FileBody {
    pub body: Body,
    pub len: u64,
    pub name: String,
}

/// Open `path` as a streaming body without reading it into memory.
pub(crate) async fn open(path: &Path) -> Result<FileBody> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::transfer(path.display().to_string(), "path has no file name"))?
        .to_string();

    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| Error::io(path, e))?;
    let len = file
        .metadata()
        .await
        .map_err(|e| Error::io(path, e))?
        .len();

    Ok(FileBody {
        body: Body::wrap_stream(ReaderStream::new(file)),
        len,
        name,
    })
}
