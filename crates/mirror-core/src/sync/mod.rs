//! SyncOrchestrator and the values it reports
//!
//! This module provides:
//! - **stage**: the run state machine (`Idle` through `Done`/`UpToDate`/`Failed`)
//! - **report**: the [`SyncReporter`] hook for status lines and the [`SyncOutcome`]
//! - **orchestrator**: decide, fetch, replace, publish, persist

mod orchestrator;
mod report;
mod stage;

pub use orchestrator::{SyncOptions, SyncOrchestrator};
pub use report::{SilentReporter, SyncOutcome, SyncReporter, SyncStatus};
pub use stage::SyncStage;
