//! logroll Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use logroll_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[log]\nlevel = \"debug\"").unwrap();
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [log]
//! format = "json"
//! output = "both"
//!
//! [log.file]
//! path = "logs/app.log"
//! rotation = "hourly"
//! max_size_mb = 100
//!
//! [loggers.audit]
//! output = "file"
//! file = { path = "logs/audit.log", rotation = "daily" }
//!
//! [monitor]
//! interval = "30s"
//! ```

mod error;
mod logging;
mod monitor;
mod validation;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use logging::{
    FileConfig, LogConfig, LogFormat, LogLevel, LogOutput, RotationInterval, SizeRollover,
    TimestampFormat,
};
pub use monitor::MonitorConfig;

use serde::Deserialize;

/// Name under which `[log]` is registered
pub const DEFAULT_LOGGER: &str = "default";

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The default logger
    pub log: LogConfig,

    /// Additional named loggers
    pub loggers: BTreeMap<String, LogConfig>,

    /// Channel depth monitor
    pub monitor: MonitorConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// The default logger followed by every named logger
    ///
    /// A `[loggers.default]` entry is shadowed by `[log]`.
    pub fn all_loggers(&self) -> impl Iterator<Item = (&str, &LogConfig)> {
        std::iter::once((DEFAULT_LOGGER, &self.log)).chain(
            self.loggers
                .iter()
                .filter(|(name, _)| name.as_str() != DEFAULT_LOGGER)
                .map(|(name, log)| (name.as_str(), log)),
        )
    }

    /// Look up a logger configuration by name
    pub fn logger(&self, name: &str) -> Option<&LogConfig> {
        if name == DEFAULT_LOGGER {
            return Some(&self.log);
        }
        self.loggers.get(name)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.log, LogConfig::default());
        assert!(config.loggers.is_empty());
        assert_eq!(config.monitor, MonitorConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_str(
            r#"
[log]
level = "warn"
format = "json"
output = "both"

[log.file]
path = "logs/app.log"
rotation = "minutely"
max_size_mb = 5

[loggers.audit]
output = "file"
file = { path = "logs/audit.log" }

[loggers.console]
format = "console"
ansi = true

[monitor]
interval = "10s"
"#,
        )
        .unwrap();

        assert_eq!(config.log.level, LogLevel::Warn);
        assert_eq!(
            config.log.file_output().map(|f| f.rotation),
            Some(RotationInterval::Minutely)
        );
        assert_eq!(config.loggers.len(), 2);
        assert_eq!(config.monitor.interval, Duration::from_secs(10));

        let names: Vec<_> = config.all_loggers().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["default", "audit", "console"]);
    }

    #[test]
    fn test_logger_lookup() {
        let config = Config::from_str("[loggers.audit]\nlevel = \"debug\"").unwrap();
        assert_eq!(config.logger("default"), Some(&config.log));
        assert_eq!(
            config.logger("audit").map(|log| log.level),
            Some(LogLevel::Debug)
        );
        assert!(config.logger("missing").is_none());
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_str("[log\nlevel = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[log]\nlevel = \"error\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.log.level, LogLevel::Error);
    }

    #[test]
    fn test_from_missing_file() {
        let err = Config::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
