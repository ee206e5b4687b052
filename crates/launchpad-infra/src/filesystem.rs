//! Data directory layout.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "LAUNCHPAD_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `LAUNCHPAD_DATA_DIR` environment variable
/// 2. `~/.launchpad`
/// 3. `./.launchpad` when no home directory is known
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".launchpad");
    }

    PathBuf::from(".launchpad")
}

/// `{data_dir}/config.toml`
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

/// `{data_dir}/state/`, where the file byte store keeps its keys.
pub fn state_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("state")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let root = Path::new("/tmp/lp");
        assert_eq!(config_path(root), PathBuf::from("/tmp/lp/config.toml"));
        assert_eq!(state_dir(root), PathBuf::from("/tmp/lp/state"));
    }

    #[test]
    fn test_resolve_data_dir_is_not_empty() {
        assert!(!resolve_data_dir().as_os_str().is_empty());
    }
}
