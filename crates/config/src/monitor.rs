//! Channel monitor configuration
//!
//! Controls how often queue depths are reported.
//!
//! # Defaults
//!
//! - `enabled`: true
//! - `interval`: 1m

use serde::Deserialize;
use std::time::Duration;

/// Channel monitor configuration
///
/// # Example
///
/// ```toml
/// [monitor]
/// enabled = true
/// interval = "30s"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Enable channel depth reporting
    /// Default: true
    pub enabled: bool,

    /// Reporting interval
    /// Default: 1m
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert!(config.enabled);
        assert_eq!(config.interval, Duration::from_secs(60));
    }

    #[test]
    fn test_deserialize_humantime() {
        let config: MonitorConfig = toml::from_str(
            r#"
enabled = false
interval = "15s"
"#,
        )
        .unwrap();
        assert!(!config.enabled);
        assert_eq!(config.interval, Duration::from_secs(15));
    }

    #[test]
    fn test_deserialize_invalid_interval() {
        let result: Result<MonitorConfig, _> = toml::from_str(r#"interval = "soon""#);
        assert!(result.is_err());
    }
}
