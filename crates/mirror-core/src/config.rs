//! Mirror configuration (`mirror.toml`)
//!
//! Every field has a default, so an absent file describes the Flutter
//! stable-channel mirror with a pCloud host.

use std::path::{Path, PathBuf};

use mirror_fs::ConfigStore;
use mirror_remote::HostConfig;
use serde::{Deserialize, Serialize};

use crate::resolver::DEFAULT_TAG_PREFIX;
use crate::{Error, Result, Version};

/// `[upstream]`: where releases come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Project name used in artifact and remote file names
    pub name: String,
    /// Git repository whose tags announce releases
    pub repository: String,
    /// Reference namespace stripped before parsing a tag
    pub tag_prefix: String,
    /// Base URL of the release archives
    pub distribution: String,
    /// Release channel segment of archive URLs and names
    pub channel: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            name: "flutter".to_string(),
            repository: "https://github.com/flutter/flutter.git".to_string(),
            tag_prefix: DEFAULT_TAG_PREFIX.to_string(),
            distribution: "https://storage.googleapis.com/flutter_infra_release/releases"
                .to_string(),
            channel: "stable".to_string(),
        }
    }
}

/// `[paths]`: local files, relative to the mirror root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub state: PathBuf,
    pub document: PathBuf,
    pub scratch: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state: PathBuf::from("latest_version.txt"),
            document: PathBuf::from("README.md"),
            scratch: PathBuf::from("sdks"),
        }
    }
}

impl PathsConfig {
    pub fn state_path(&self, root: &Path) -> PathBuf {
        root.join(&self.state)
    }

    pub fn document_path(&self, root: &Path) -> PathBuf {
        root.join(&self.document)
    }

    pub fn scratch_path(&self, root: &Path) -> PathBuf {
        root.join(&self.scratch)
    }
}

/// `[vcs]`: handing the changed paths to git
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VcsConfig {
    pub enabled: bool,
    pub remote: String,
    pub push: bool,
    /// Commit message template; `{name}` and `{version}` are substituted
    pub message: String,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            remote: "origin".to_string(),
            push: true,
            message: "Mirror {name} {version}".to_string(),
        }
    }
}

impl VcsConfig {
    pub fn commit_message(&self, name: &str, version: Version) -> String {
        self.message
            .replace("{name}", name)
            .replace("{version}", &version.to_string())
    }
}

/// `[sync]`: run behaviour
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Keep `{scratch}/{version}` after a successful run
    pub keep_artifacts: bool,
}

/// The whole `mirror.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    pub upstream: UpstreamConfig,
    pub paths: PathsConfig,
    pub host: HostConfig,
    pub vcs: VcsConfig,
    pub sync: SyncSettings,
}

impl MirrorConfig {
    /// Load from `path`, using defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = ConfigStore::new().load_or_default(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Write this configuration to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("upstream.name", &self.upstream.name),
            ("upstream.repository", &self.upstream.repository),
            ("upstream.distribution", &self.upstream.distribution),
            ("upstream.channel", &self.upstream.channel),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Config {
                    message: format!("{key} must not be empty"),
                });
            }
        }
        if self.upstream.name.contains(['/', '\\']) {
            return Err(Error::Config {
                message: format!("upstream.name '{}' must not contain a path separator", self.upstream.name),
            });
        }
        Ok(())
    }
}
