//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Release mirror - keep mirrored release archives and their links current
#[derive(Parser, Debug)]
#[command(name = "release-mirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Mirror configuration file; its directory is the mirror root
    #[arg(
        short,
        long,
        global = true,
        env = "MIRROR_CONFIG",
        default_value = "mirror.toml"
    )]
    pub config: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Mirror the latest upstream release, or VERSION when given
    ///
    /// Without VERSION the run stops early when the stored version is
    /// already current. An explicit VERSION is always mirrored.
    ///
    /// Examples:
    ///   release-mirror sync              # Mirror upstream latest if newer
    ///   release-mirror sync 3.24.0       # Re-mirror a specific release
    ///   release-mirror sync --dry-run    # Show what would happen
    Sync {
        /// Release to mirror (major.minor.patch)
        version: Option<String>,

        /// Decide and plan only; no authentication, transfer or writes
        #[arg(long)]
        dry_run: bool,

        /// Output the run outcome as JSON
        #[arg(long)]
        json: bool,

        /// Do not commit or push the changed files
        #[arg(long)]
        no_commit: bool,

        /// Keep downloaded archives in the scratch directory
        #[arg(long)]
        keep_artifacts: bool,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Show stored and upstream versions and whether a sync is needed
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sync_with_version_and_flags() {
        let cli = Cli::try_parse_from([
            "release-mirror",
            "sync",
            "3.24.0",
            "--dry-run",
            "--no-commit",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Some(Commands::Sync {
                version: Some("3.24.0".to_string()),
                dry_run: true,
                json: false,
                no_commit: true,
                keep_artifacts: false,
            })
        );
    }

    #[test]
    fn parse_global_config_after_subcommand() {
        let cli = Cli::try_parse_from([
            "release-mirror",
            "status",
            "--json",
            "--config",
            "/srv/mirror/mirror.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/srv/mirror/mirror.toml"));
        assert_eq!(cli.command, Some(Commands::Status { json: true }));
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::try_parse_from(["release-mirror", "init", "--force"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Init { force: true }));
        assert_eq!(cli.config, PathBuf::from("mirror.toml"));
    }

    #[test]
    fn parse_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["release-mirror", "upload"]).is_err());
    }
}
