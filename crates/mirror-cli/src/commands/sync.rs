//! Sync command implementation

use std::path::Path;

use colored::Colorize;
use mirror_core::{
    MirrorConfig, SilentReporter, SyncOptions, SyncOrchestrator, SyncOutcome, SyncReporter,
    SyncStatus,
};
use mirror_git::{ChangePublisher, CommitOutcome, RemoteTagSource};
use mirror_remote::HttpDownloader;
use serde::Serialize;

use super::{mirror_root, runtime};
use crate::credentials;
use crate::error::Result;
use crate::reporter::ConsoleReporter;

/// Arguments of `release-mirror sync`
#[derive(Debug, Clone, Default)]
pub struct SyncArgs {
    pub version: Option<String>,
    pub dry_run: bool,
    pub json: bool,
    pub no_commit: bool,
    pub keep_artifacts: bool,
}

#[derive(Debug, Serialize)]
struct CommitSummary {
    committed: bool,
    id: Option<String>,
    pushed: bool,
}

impl From<&CommitOutcome> for CommitSummary {
    fn from(outcome: &CommitOutcome) -> Self {
        match outcome {
            CommitOutcome::NothingToCommit => Self {
                committed: false,
                id: None,
                pushed: false,
            },
            CommitOutcome::Committed { id, pushed } => Self {
                committed: true,
                id: Some(id.clone()),
                pushed: *pushed,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct SyncReport<'a> {
    #[serde(flatten)]
    outcome: &'a SyncOutcome,
    commit: Option<CommitSummary>,
}

/// Run the sync command
pub fn run_sync(config_path: &Path, args: SyncArgs) -> Result<()> {
    let root = mirror_root(config_path)?;
    let config = MirrorConfig::load(config_path)?;
    let credentials = if args.dry_run {
        None
    } else {
        credentials::load(&root)?
    };

    let reporter: Box<dyn SyncReporter> = if args.json {
        Box::new(SilentReporter)
    } else {
        Box::new(ConsoleReporter)
    };
    let orchestrator = SyncOrchestrator::from_config(
        &config,
        &root,
        Box::new(RemoteTagSource::new(&config.upstream.repository)),
        Box::new(HttpDownloader::new()?),
        mirror_remote::connect(&config.host)?,
    )
    .with_reporter(reporter);

    let options = SyncOptions {
        dry_run: args.dry_run,
        keep_artifacts: args.keep_artifacts || config.sync.keep_artifacts,
    };
    let outcome = runtime()?.block_on(orchestrator.run(
        args.version.as_deref(),
        credentials.as_ref(),
        &options,
    ))?;

    let commit = if outcome.is_synced() && config.vcs.enabled && !args.no_commit {
        Some(hand_off(&root, &config, &outcome)?)
    } else {
        None
    };

    if args.json {
        let report = SyncReport {
            outcome: &outcome,
            commit: commit.as_ref().map(CommitSummary::from),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&outcome, commit.as_ref());
    }
    Ok(())
}

/// Give the changed paths to git: stage, commit, push.
fn hand_off(root: &Path, config: &MirrorConfig, outcome: &SyncOutcome) -> Result<CommitOutcome> {
    let message = config
        .vcs
        .commit_message(&config.upstream.name, outcome.version);
    let publisher = ChangePublisher::discover(root)?
        .with_remote(&config.vcs.remote)
        .with_push(config.vcs.push);
    Ok(publisher.publish(&outcome.changed_paths, &message)?)
}

fn print_summary(outcome: &SyncOutcome, commit: Option<&CommitOutcome>) {
    println!();
    match outcome.status {
        SyncStatus::UpToDate => {
            println!("{} {}", "Already mirrored:".green(), outcome.version.to_string().cyan());
        }
        SyncStatus::DryRun => {
            println!(
                "{} {} ({} artifacts)",
                "Would mirror".yellow().bold(),
                outcome.version.to_string().cyan(),
                outcome.planned.len()
            );
        }
        SyncStatus::Synced => {
            println!("{} {}", "Mirrored".green().bold(), outcome.version.to_string().cyan());
            for (platform, link) in &outcome.links {
                println!("  {} {}: {}", "+".green(), platform, link);
            }
            for path in &outcome.artifacts {
                println!("  {} kept {}", "+".green(), path.display());
            }
        }
    }

    match commit {
        Some(CommitOutcome::Committed { id, pushed }) => {
            let short = id.get(..8).unwrap_or(id);
            let pushed = if *pushed { " and pushed" } else { "" };
            println!("{} {}{}", "Committed".green(), short, pushed);
        }
        Some(CommitOutcome::NothingToCommit) => println!("{}", "Nothing to commit".dimmed()),
        None => {}
    }
}
