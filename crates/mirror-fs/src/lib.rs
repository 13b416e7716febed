//! Filesystem helpers for the release mirror
//!
//! Provides atomic writes for the persisted state and linked document,
//! staging of downloaded artifacts, and format-aware config loading.

pub mod config;
pub mod error;
pub mod io;

pub use config::ConfigStore;
pub use error::{Error, Result};
