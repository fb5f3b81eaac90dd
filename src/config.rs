//! Configuration loading and management
//!
//! Handles parsing of `.tms.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE: &str = ".tms.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Command log configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Snapshot configuration
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

/// Command log configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of undo entries kept (0 = unlimited)
    #[serde(default)]
    pub limit: usize,
}

/// Snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Default path for `Store`/`Load` when the CLI is asked to preload
    #[serde(default = "default_snapshot_path")]
    pub path: PathBuf,

    /// Create missing parent directories on store
    #[serde(default = "default_true")]
    pub create_dirs: bool,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("tms.snapshot")
}

fn default_true() -> bool {
    true
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
            create_dirs: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from a `.tms.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.tms.toml` from a directory. A missing file yields defaults; a
    /// malformed one is an error.
    pub fn load_from_dir(dir: &Path) -> crate::error::Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.snapshot.path.as_os_str().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "snapshot.path cannot be empty".to_string(),
            ));
        }
        if self.snapshot.path.is_dir() {
            return Err(crate::error::Error::InvalidConfig(format!(
                "snapshot.path '{}' is a directory",
                self.snapshot.path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let config = Config::default();
        assert_eq!(config.history.limit, 0);
        assert_eq!(config.snapshot.path, PathBuf::from("tms.snapshot"));
        assert!(config.snapshot.create_dirs);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[history]\nlimit = 5\n").unwrap();

        let config = Config::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.history.limit, 5);
        assert!(config.snapshot.create_dirs);
    }

    #[test]
    fn empty_snapshot_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[snapshot]\npath = \"\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidConfig(_)));
    }
}
