//! Platform link rewriting for the linked document

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mirror_fs::io;

use crate::{Platform, Result};

/// Replace every line that starts with a platform marker by
/// `<marker>(<url>)`. Lines without a marker, and marker lines whose
/// platform has no link, come back unchanged and in order.
pub fn apply_links<S: AsRef<str>>(lines: &[S], links: &BTreeMap<Platform, String>) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            rewrite_line(line, links).unwrap_or_else(|| line.to_string())
        })
        .collect()
}

/// [`apply_links`] over a whole text, keeping each line's terminator
/// (`\n`, `\r\n` or none on the last line) as it was.
pub fn rewrite_document(text: &str, links: &BTreeMap<Platform, String>) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in text.split_inclusive('\n') {
        let (line, ending) = split_line_ending(segment);
        match rewrite_line(line, links) {
            Some(rewritten) => out.push_str(&rewritten),
            None => out.push_str(line),
        }
        out.push_str(ending);
    }
    out
}

fn rewrite_line(line: &str, links: &BTreeMap<Platform, String>) -> Option<String> {
    let platform = Platform::ALL
        .into_iter()
        .find(|p| line.starts_with(p.marker()))?;
    let url = links.get(&platform)?;
    Some(format!("{}({url})", platform.marker()))
}

fn split_line_ending(segment: &str) -> (&str, &str) {
    if let Some(line) = segment.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = segment.strip_suffix('\n') {
        (line, "\n")
    } else {
        (segment, "")
    }
}

/// Applies links to the document file in place.
pub struct LinkPublisher {
    document: PathBuf,
}

impl LinkPublisher {
    pub fn new(document: impl Into<PathBuf>) -> Self {
        Self {
            document: document.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.document
    }

    /// Rewrite the document. Returns whether its content changed; an
    /// unchanged document is not rewritten.
    pub fn publish(&self, links: &BTreeMap<Platform, String>) -> Result<bool> {
        let original = io::read_text(&self.document)?;
        let rewritten = rewrite_document(&original, links);
        if rewritten == original {
            tracing::debug!(path = %self.document.display(), "Document already up to date");
            return Ok(false);
        }

        io::write_atomic(&self.document, rewritten.as_bytes())?;
        tracing::info!(path = %self.document.display(), links = links.len(), "Rewrote document links");
        Ok(true)
    }
}
