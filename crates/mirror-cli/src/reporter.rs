//! Console status lines for sync runs

use colored::Colorize;
use mirror_core::{Error, SyncReporter, SyncStage};

/// Prints one `=> stage` line per state and indented step lines.
pub struct ConsoleReporter;

impl SyncReporter for ConsoleReporter {
    fn stage(&self, stage: SyncStage) {
        match stage {
            SyncStage::Idle => {}
            SyncStage::UpToDate | SyncStage::Done => {
                println!("{} {}", "=>".green().bold(), stage.label().green().bold());
            }
            _ => println!("{} {}", "=>".blue().bold(), stage.label().bold()),
        }
    }

    fn step(&self, message: &str) {
        println!("   {}", message.dimmed());
    }

    fn failed(&self, stage: SyncStage, _error: &Error) {
        eprintln!(
            "{} {} while {}",
            "=>".red().bold(),
            "Failed".red().bold(),
            stage.label().to_lowercase()
        );
    }
}
