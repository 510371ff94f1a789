//! Configuration file (`config.yaml`)
//!
//! ```yaml
//! database: /var/lib/tributary/lineage.db
//! merge_policy: deduplicate
//! default_depth:
//!   upstream: 2
//!   downstream: 1
//! log_level: debug
//! ```
//!
//! Every key is optional.

use crate::assembler::MergePolicy;
use crate::graph::LineageDepth;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TributaryConfig {
    /// SQLite catalog path; `None` means the platform data directory
    pub database: Option<PathBuf>,
    pub merge_policy: MergePolicy,
    /// Depth of the initial fetch when a view is opened
    pub default_depth: LineageDepth,
    /// Fallback filter when `TRIBUTARY_LOG` is unset
    pub log_level: String,
}

impl Default for TributaryConfig {
    fn default() -> Self {
        Self {
            database: None,
            merge_policy: MergePolicy::default(),
            default_depth: LineageDepth::default(),
            log_level: "info".to_string(),
        }
    }
}

impl TributaryConfig {
    /// Read a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Load from `explicit` if given, else the default location if it
    /// exists, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Configured database path, or `<data_dir>/tributary/lineage.db`
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(default_db_path)
    }
}

/// `<config_dir>/tributary/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tributary").join("config.yaml"))
}

/// Get the default database path (~/.local/share/tributary/lineage.db)
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("tributary").join("lineage.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(TributaryConfig::from_yaml("").unwrap(), TributaryConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = TributaryConfig::from_yaml("merge_policy: deduplicate\n").unwrap();
        assert_eq!(config.merge_policy, MergePolicy::Deduplicate);
        assert_eq!(config.default_depth, LineageDepth::new(1, 1));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn full_file_parses() {
        let yaml = r#"
database: /tmp/lineage.db
merge_policy: append
default_depth:
  upstream: 2
  downstream: 3
log_level: debug
"#;
        let config = TributaryConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/lineage.db"));
        assert_eq!(config.default_depth, LineageDepth::new(2, 3));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn partial_depth_keeps_the_other_side() {
        let config = TributaryConfig::from_yaml("default_depth:\n  upstream: 2\n").unwrap();
        assert_eq!(config.default_depth, LineageDepth::new(2, 1));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(TributaryConfig::from_yaml("databse: x\n").is_err());
    }

    #[test]
    fn from_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "merge_policy: sideways").unwrap();

        let err = TributaryConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == file.path()));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TributaryConfig::load(Some(&dir.path().join("nope.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
