//! Platform archives of a release
//!
//! Source URLs depend on `(platform, version)`, remote file names on the
//! platform alone, so each upload replaces the previous version's file.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::UpstreamConfig;
use crate::Version;

/// The closed set of mirrored platforms, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Linux,
    Macos,
    MacosArm64,
    Windows,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Linux,
        Platform::Macos,
        Platform::MacosArm64,
        Platform::Windows,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::MacosArm64 => "macos-arm64",
            Self::Windows => "windows",
        }
    }

    /// Line prefix identifying this platform's entry in the linked document
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Linux => "- [Linux]",
            Self::Macos => "- [macOS]",
            Self::MacosArm64 => "- [macOS ARM64]",
            Self::Windows => "- [Windows]",
        }
    }

    /// Directory of the distribution host holding this platform's archives
    fn directory(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Macos | Self::MacosArm64 => "macos",
            Self::Windows => "windows",
        }
    }

    fn file_stem(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::MacosArm64 => "macos_arm64",
            Self::Windows => "windows",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Self::Linux => "tar.xz",
            Self::Macos | Self::MacosArm64 | Self::Windows => "zip",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One platform's release archive for a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub platform: Platform,
    pub version: Version,
    pub source_url: String,
    pub local_file_name: String,
    pub remote_file_name: String,
}

/// Maps versions to their four platform artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCatalog {
    name: String,
    distribution: String,
    channel: String,
}

impl Default for ArtifactCatalog {
    fn default() -> Self {
        Self::from_upstream(&UpstreamConfig::default())
    }
}

impl ArtifactCatalog {
    pub fn new(
        name: impl Into<String>,
        distribution: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            distribution: distribution.into().trim_end_matches('/').to_string(),
            channel: channel.into(),
        }
    }

    pub fn from_upstream(upstream: &UpstreamConfig) -> Self {
        Self::new(&upstream.name, &upstream.distribution, &upstream.channel)
    }

    /// All four artifacts in [`Platform::ALL`] order.
    pub fn for_version(&self, version: Version) -> Vec<Artifact> {
        Platform::ALL
            .iter()
            .map(|&platform| self.artifact(platform, version))
            .collect()
    }

    pub fn artifact(&self, platform: Platform, version: Version) -> Artifact {
        let local_file_name = format!(
            "{}_{}_{}-{}.{}",
            self.name,
            platform.file_stem(),
            version,
            self.channel,
            platform.extension()
        );
        let source_url = format!(
            "{}/{}/{}/{}",
            self.distribution,
            self.channel,
            platform.directory(),
            local_file_name
        );

        Artifact {
            platform,
            version,
            source_url,
            local_file_name,
            remote_file_name: self.remote_file_name(platform),
        }
    }

    /// Version-independent name of `platform`'s file on the remote host
    pub fn remote_file_name(&self, platform: Platform) -> String {
        format!("{}_{}.{}", self.name, platform.file_stem(), platform.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(
        Platform::Linux,
        "https://storage.googleapis.com/flutter_infra_release/releases/stable/linux/flutter_linux_3.24.0-stable.tar.xz",
        "flutter_linux.tar.xz"
    )]
    #[case(
        Platform::Macos,
        "https://storage.googleapis.com/flutter_infra_release/releases/stable/macos/flutter_macos_3.24.0-stable.zip",
        "flutter_macos.zip"
    )]
    #[case(
        Platform::MacosArm64,
        "https://storage.googleapis.com/flutter_infra_release/releases/stable/macos/flutter_macos_arm64_3.24.0-stable.zip",
        "flutter_macos_arm64.zip"
    )]
    #[case(
        Platform::Windows,
        "https://storage.googleapis.com/flutter_infra_release/releases/stable/windows/flutter_windows_3.24.0-stable.zip",
        "flutter_windows.zip"
    )]
    fn test_default_templates(
        #[case] platform: Platform,
        #[case] url: &str,
        #[case] remote: &str,
    ) {
        let artifact = ArtifactCatalog::default().artifact(platform, Version::new(3, 24, 0));
        assert_eq!(artifact.source_url, url);
        assert_eq!(artifact.remote_file_name, remote);
        assert!(url.ends_with(&artifact.local_file_name));
    }

    #[test]
    fn test_for_version_fixed_order() {
        let artifacts = ArtifactCatalog::default().for_version(Version::new(1, 3, 0));
        let platforms: Vec<Platform> = artifacts.iter().map(|a| a.platform).collect();
        assert_eq!(platforms, Platform::ALL.to_vec());
        assert!(artifacts.iter().all(|a| a.version == Version::new(1, 3, 0)));
    }

    #[test]
    fn test_remote_names_do_not_depend_on_version() {
        let catalog = ArtifactCatalog::default();
        let old = catalog.for_version(Version::new(1, 2, 0));
        let new = catalog.for_version(Version::new(1, 3, 0));
        for (a, b) in old.iter().zip(&new) {
            assert_eq!(a.remote_file_name, b.remote_file_name);
            assert_ne!(a.source_url, b.source_url);
            assert!(!a.remote_file_name.contains("1.2.0"));
        }
    }

    #[test]
    fn test_custom_upstream() {
        let catalog = ArtifactCatalog::new("dart", "https://dl.example.test/archive/", "beta");
        let artifact = catalog.artifact(Platform::Windows, Version::new(2, 0, 1));
        assert_eq!(
            artifact.source_url,
            "https://dl.example.test/archive/beta/windows/dart_windows_2.0.1-beta.zip"
        );
        assert_eq!(artifact.remote_file_name, "dart_windows.zip");
    }

    #[test]
    fn test_markers_are_distinct_prefixes() {
        for a in Platform::ALL {
            for b in Platform::ALL {
                if a != b {
                    let line = format!("{}(x)", b.marker());
                    assert!(!line.starts_with(a.marker()), "{a} marker matches {b} line");
                }
            }
        }
    }
}
