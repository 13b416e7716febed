//! Status reporting and run outcomes

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use super::SyncStage;
use crate::{Artifact, Error, Platform, Version};

/// Receives status lines while a run progresses.
///
/// All methods default to doing nothing.
pub trait SyncReporter: Send + Sync {
    /// The run entered `stage`
    fn stage(&self, _stage: SyncStage) {}

    /// A step within the current stage completed or is starting
    fn step(&self, _message: &str) {}

    /// The run failed while in `stage`
    fn failed(&self, _stage: SyncStage, _error: &Error) {}
}

/// Reporter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl SyncReporter for SilentReporter {}

/// How a completed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    /// Stored version already covers the target; nothing was touched
    UpToDate,
    /// The full cycle ran
    Synced,
    /// A sync was needed but only planned
    DryRun,
}

/// Result of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub status: SyncStatus,
    /// The version that was targeted
    pub version: Version,
    /// Stored version before the run
    pub previous: Option<Version>,
    /// Every state entered, in order
    pub stages: Vec<SyncStage>,
    /// Public links obtained, by platform
    pub links: BTreeMap<Platform, String>,
    /// Local paths whose content changed, for the VCS collaborator
    pub changed_paths: Vec<PathBuf>,
    /// Fetched archives still on disk after the run
    pub artifacts: Vec<PathBuf>,
    /// Artifacts the run processed (or would process, for a dry run)
    pub planned: Vec<Artifact>,
}

impl SyncOutcome {
    pub fn final_stage(&self) -> Option<SyncStage> {
        self.stages.last().copied()
    }

    pub fn is_synced(&self) -> bool {
        self.status == SyncStatus::Synced
    }
}
