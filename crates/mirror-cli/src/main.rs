//! Release mirror CLI
//!
//! Mirrors the platform archives of an upstream release to a remote host,
//! rewrites the document's download links and hands the changes to git.

mod cli;
mod commands;
mod credentials;
mod error;
mod reporter;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::SyncArgs;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(&cli.config, cmd),
        None => {
            println!("{} Release mirror", "release-mirror".green().bold());
            println!();
            println!("Run {} for available commands.", "release-mirror --help".cyan());
            Ok(())
        }
    }
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_ok() && verbose {
        tracing::debug!("Verbose mode enabled");
    }
}

fn execute_command(config: &std::path::Path, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Sync {
            version,
            dry_run,
            json,
            no_commit,
            keep_artifacts,
        } => commands::run_sync(
            config,
            SyncArgs {
                version,
                dry_run,
                json,
                no_commit,
                keep_artifacts,
            },
        ),
        Commands::Init { force } => commands::run_init(config, force),
        Commands::Status { json } => commands::run_status(config, json),
    }
}
