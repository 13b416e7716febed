//! Core orchestration layer for the release mirror
//!
//! This crate decides whether an upstream release needs mirroring and drives
//! the whole cycle when it does:
//!
//! - **Versions**: strict `major.minor.patch` triples with numeric ordering
//! - **VersionResolver**: latest conforming tag of the upstream repository
//! - **SyncStateStore**: the last mirrored version, persisted as plain text
//! - **ArtifactCatalog**: the four platform archives of a version
//! - **ArtifactFetcher**: download into scratch storage, stage for upload
//! - **LinkPublisher**: rewrite the platform lines of the linked document
//! - **SyncOrchestrator**: decide, fetch, replace, publish, persist
//!
//! # Architecture
//!
//! ```text
//!                  mirror-cli
//!                      |
//!                 mirror-core
//!                      |
//!        +-------------+-------------+
//!        |             |             |
//!    mirror-fs     mirror-git   mirror-remote
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mirror_core::{MirrorConfig, SyncOptions, SyncOrchestrator};
//!
//! let config = MirrorConfig::load(&root.join("mirror.toml"))?;
//! let orchestrator = SyncOrchestrator::from_config(&config, &root, tags, downloader, host);
//! let outcome = orchestrator.run(None, Some(&credentials), &SyncOptions::default()).await?;
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod links;
pub mod resolver;
pub mod state;
pub mod sync;
pub mod version;

pub use catalog::{Artifact, ArtifactCatalog, Platform};
pub use config::{MirrorConfig, PathsConfig, SyncSettings, UpstreamConfig, VcsConfig};
pub use error::{Error, Result};
pub use fetch::ArtifactFetcher;
pub use links::{LinkPublisher, apply_links, rewrite_document};
pub use resolver::{VersionResolver, latest_from_refs};
pub use state::SyncStateStore;
pub use sync::{
    SilentReporter, SyncOptions, SyncOrchestrator, SyncOutcome, SyncReporter, SyncStage,
    SyncStatus,
};
pub use version::Version;
