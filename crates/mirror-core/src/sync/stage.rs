//! Run states

use std::fmt;

use serde::Serialize;

/// State of a sync run.
///
/// ```text
/// Idle -> ResolvingVersion -> CheckingNeed -> UpToDate
///                                          -> Fetching -> Replacing -> Publishing -> Persisting -> Done
/// ```
///
/// `Failed` is reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStage {
    Idle,
    ResolvingVersion,
    CheckingNeed,
    UpToDate,
    Fetching,
    Replacing,
    Publishing,
    Persisting,
    Done,
    Failed,
}

impl SyncStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::UpToDate | Self::Done | Self::Failed)
    }

    /// Human-readable label for status lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::ResolvingVersion => "Resolving version",
            Self::CheckingNeed => "Checking whether a sync is needed",
            Self::UpToDate => "Up to date",
            Self::Fetching => "Fetching artifacts",
            Self::Replacing => "Replacing remote files",
            Self::Publishing => "Publishing links",
            Self::Persisting => "Persisting state",
            Self::Done => "Done",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
