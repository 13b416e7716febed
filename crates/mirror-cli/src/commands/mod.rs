//! Command implementations for mirror-cli

pub mod init;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

pub use init::run_init;
pub use status::run_status;
pub use sync::{SyncArgs, run_sync};

use crate::error::Result;

/// Directory the configured relative paths are resolved against.
pub fn mirror_root(config_path: &Path) -> Result<PathBuf> {
    let parent = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf);
    match parent {
        Some(dir) => Ok(dir),
        None => Ok(std::env::current_dir()?),
    }
}

/// Single-threaded runtime for the network-bound sync run.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_config_directory() {
        assert_eq!(
            mirror_root(Path::new("/srv/mirror/mirror.toml")).unwrap(),
            PathBuf::from("/srv/mirror")
        );
    }

    #[test]
    fn bare_config_name_uses_current_dir() {
        assert_eq!(
            mirror_root(Path::new("mirror.toml")).unwrap(),
            std::env::current_dir().unwrap()
        );
    }
}
