//! Configuration validation
//!
//! Validates config consistency:
//! - File outputs have a `[file]` section with a non-empty path
//! - No two loggers rotate the same base path
//! - Monitor interval is non-zero

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::logging::LogConfig;
use std::collections::BTreeMap;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    for (name, log) in config.all_loggers() {
        validate_logger(name, log)?;
    }
    validate_file_paths(config)?;
    validate_monitor(config)?;
    Ok(())
}

fn validate_logger(name: &str, log: &LogConfig) -> Result<()> {
    if !log.output.uses_file() {
        return Ok(());
    }

    let Some(file) = log.file.as_ref() else {
        return Err(ConfigError::missing_field("logger", name, "file"));
    };

    if file.path.trim().is_empty() {
        return Err(ConfigError::missing_field("logger", name, "file.path"));
    }

    Ok(())
}

/// Each rotating writer must own its base path
fn validate_file_paths(config: &Config) -> Result<()> {
    let mut paths: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for (name, log) in config.all_loggers() {
        if let Some(file) = log.file_output() {
            paths.entry(file.path.as_str()).or_default().push(name);
        }
    }

    for (path, loggers) in &paths {
        if loggers.len() > 1 {
            return Err(ConfigError::duplicate_file_path(*path, loggers.join(", ")));
        }
    }

    Ok(())
}

fn validate_monitor(config: &Config) -> Result<()> {
    if config.monitor.enabled && config.monitor.interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "monitor",
            "monitor",
            "interval",
            "must be greater than zero",
        ));
    }
    Ok(())
}
