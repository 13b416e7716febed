//! Status command implementation

use std::path::Path;

use colored::Colorize;
use mirror_core::{MirrorConfig, SyncStateStore, Version, VersionResolver};
use mirror_git::RemoteTagSource;
use serde::Serialize;

use super::mirror_root;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct StatusReport {
    upstream: String,
    stored: Option<Version>,
    latest: Option<Version>,
    needs_sync: bool,
    host: String,
}

/// Run the status command
pub fn run_status(config_path: &Path, json: bool) -> Result<()> {
    let root = mirror_root(config_path)?;
    let config = MirrorConfig::load(config_path)?;

    let stored = SyncStateStore::new(config.paths.state_path(&root)).read_last()?;
    let resolver = VersionResolver::new(Box::new(RemoteTagSource::new(&config.upstream.repository)))
        .with_prefix(&config.upstream.tag_prefix);
    let latest = resolver.resolve_latest()?;
    let latest = (!latest.is_zero()).then_some(latest);

    let report = StatusReport {
        upstream: config.upstream.repository.clone(),
        stored,
        latest,
        needs_sync: needs_sync(stored, latest),
        host: config.host.kind.to_string(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let show = |v: Option<Version>| v.map_or_else(|| "none".dimmed().to_string(), |v| v.to_string().cyan().to_string());
    println!("{}", "Mirror Status".bold());
    println!();
    println!("{}: {}", "Upstream".dimmed(), report.upstream);
    println!("{}:     {}", "Host".dimmed(), report.host);
    println!("{}:   {}", "Stored".dimmed(), show(report.stored));
    println!("{}:   {}", "Latest".dimmed(), show(report.latest));
    println!();
    if report.needs_sync {
        println!("{} (run {})", "Sync needed".yellow().bold(), "release-mirror sync".cyan());
    } else if report.latest.is_none() {
        println!("{}", "No release tag found upstream".yellow());
    } else {
        println!("{}", "Up to date".green().bold());
    }
    Ok(())
}

fn needs_sync(stored: Option<Version>, latest: Option<Version>) -> bool {
    match (stored, latest) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(stored), Some(latest)) => latest > stored,
    }
}
