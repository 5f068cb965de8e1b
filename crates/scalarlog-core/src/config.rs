//! Logger configuration: where records go.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sink::EventSink;

/// Directory used when the default logger is first touched without setup.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// File-backed configuration for a directory target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Directory the event file is created in (created if absent).
    pub log_dir: PathBuf,
    /// Appended to the generated event file name.
    pub filename_suffix: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            filename_suffix: String::new(),
        }
    }
}

impl LoggerConfig {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_filename_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.filename_suffix = suffix.into();
        self
    }

    /// Load a config from a YAML file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}

/// Where a [`Logger`](crate::Logger) sends its records.
///
/// Exactly one destination is chosen when the logger is built; there is no
/// way to express "both" or "neither".
pub enum Target {
    /// Open a fresh event file inside this directory.
    Directory(PathBuf),
    /// Append to a caller-owned sink. The logger never closes it.
    Sink(Box<dyn EventSink>),
}

impl Target {
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Target::Directory(dir.into())
    }

    pub fn sink(sink: impl EventSink + 'static) -> Self {
        Target::Sink(Box::new(sink))
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Directory(dir) => f.debug_tuple("Directory").field(dir).finish(),
            Target::Sink(_) => f.write_str("Sink(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_points_at_logs() {
        let config = LoggerConfig::default();
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert!(config.filename_suffix.is_empty());
    }

    #[test]
    fn test_load_partial_yaml_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("scalarlog.yaml");
        fs::write(&path, "filename_suffix: .worker0\n").unwrap();

        let config = LoggerConfig::load(&path).unwrap();
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.filename_suffix, ".worker0");
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("scalarlog.yaml");
        let config = LoggerConfig::new("runs/a").with_filename_suffix(".x");
        config.save(&path).unwrap();
        assert_eq!(LoggerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_rejects_malformed_yaml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.yaml");
        fs::write(&path, "log_dir: [unterminated\n").unwrap();
        assert!(matches!(
            LoggerConfig::load(&path),
            Err(crate::ScalarLogError::Yaml(_))
        ));
    }
}
