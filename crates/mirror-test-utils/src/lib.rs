//! Shared test utilities for the release-mirror workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: upstream repositories with tags and working trees with a remote
//! - [`fakes`]: in-memory [`RemoteHost`](mirror_remote::RemoteHost),
//!   [`Downloader`](mirror_remote::Downloader) and
//!   [`TagSource`](mirror_git::TagSource) implementations
//! - [`workspace`]: [`MirrorWorkspace`] builder for a mirror checkout on disk

pub mod fakes;
pub mod git;
pub mod workspace;

pub use fakes::{FakeDownloader, FakeRemoteHost, HostCall, StaticTagSource};
pub use workspace::{MirrorWorkspace, SAMPLE_DOCUMENT};
