//! [`MirrorWorkspace`] builder for mirror checkouts in a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Document with one line per platform marker, as kept in a mirror checkout.
pub const SAMPLE_DOCUMENT: &str = "\
# Flutter SDK mirror

Latest stable SDK downloads:

- [Linux](https://old.example.test/linux)
- [macOS](https://old.example.test/macos)
- [macOS ARM64](https://old.example.test/macos_arm64)
- [Windows](https://old.example.test/windows)

Mirrored automatically.
";

/// A temporary mirror checkout with a linked document and optional state.
///
/// # Example
///
/// ```rust,no_run
/// use mirror_test_utils::MirrorWorkspace;
///
/// let workspace = MirrorWorkspace::new().with_state("1.2.0");
/// workspace.assert_file_exists("README.md");
/// ```
pub struct MirrorWorkspace {
    temp_dir: TempDir,
}

impl Default for MirrorWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl MirrorWorkspace {
    /// Create a checkout holding [`SAMPLE_DOCUMENT`] as `README.md`.
    pub fn new() -> Self {
        let workspace = Self::empty();
        workspace.write("README.md", SAMPLE_DOCUMENT);
        workspace
    }

    /// Create an empty temporary directory.
    pub fn empty() -> Self {
        Self {
            temp_dir: TempDir::new()
                .unwrap_or_else(|e| panic!("MirrorWorkspace: failed to create temp dir: {e}")),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Persist `version` as the last mirrored version.
    pub fn with_state(self, version: &str) -> Self {
        self.write("latest_version.txt", version);
        self
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("MirrorWorkspace: mkdir {}: {e}", parent.display()));
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("MirrorWorkspace: write {}: {e}", path.display()));
    }

    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("MirrorWorkspace: read {}: {e}", path.display()))
    }

    /// Contents of the state file, `None` when it was never written.
    pub fn state(&self) -> Option<String> {
        fs::read_to_string(self.path("latest_version.txt")).ok()
    }

    pub fn assert_file_exists(&self, relative: &str) {
        assert!(
            self.path(relative).exists(),
            "expected {relative} to exist in {}",
            self.root().display()
        );
    }

    pub fn assert_file_missing(&self, relative: &str) {
        assert!(
            !self.path(relative).exists(),
            "expected {relative} to be absent from {}",
            self.root().display()
        );
    }
}
