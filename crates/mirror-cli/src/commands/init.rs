//! Init command implementation

use std::path::Path;

use colored::Colorize;
use mirror_core::MirrorConfig;

use crate::error::{CliError, Result};

/// Write the default configuration to `config_path`.
pub fn run_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        return Err(CliError::user(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )));
    }

    MirrorConfig::default().save(config_path)?;
    tracing::info!(path = %config_path.display(), "Wrote default configuration");

    println!("{} {}", "Created".green().bold(), config_path.display());
    println!(
        "Set {} and {} (or a .env file next to it) before the first sync.",
        "MIRROR_IDENTITY".cyan(),
        "MIRROR_SECRET".cyan()
    );
    Ok(())
}
