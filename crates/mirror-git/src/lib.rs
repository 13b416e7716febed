//! Git abstraction for the release mirror
//!
//! Two concerns live here:
//!
//! - [`tags`]: listing the reference namespace of an upstream repository
//!   without cloning it (the `git ls-remote` equivalent)
//! - [`vcs`]: staging, committing, and pushing the paths a sync run changed

pub mod error;
pub mod tags;
pub mod vcs;

pub use error::{Error, Result};
pub use tags::{RemoteTagSource, TagSource};
pub use vcs::{ChangePublisher, CommitOutcome};
