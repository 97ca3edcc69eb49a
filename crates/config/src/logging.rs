//! Logging configuration
//!
//! Describes one logger: level, encoding, where records go, and how the
//! file output rotates.

use serde::Deserialize;

/// Log level
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level - very verbose
    Trace,
    /// Debug level - debugging information
    Debug,
    /// Info level - normal operation (default)
    #[default]
    Info,
    /// Warn level - warnings only
    Warn,
    /// Error level - errors only
    Error,
}

impl LogLevel {
    /// Convert to tracing level filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output (default)
    #[default]
    Console,
    /// JSON structured logging
    Json,
}

/// Log output destination
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Write to stdout (default)
    #[default]
    Stdout,
    /// Write to stderr
    Stderr,
    /// Write to the rotating file described by `[file]`
    File,
    /// Write to stdout and the rotating file
    Both,
}

impl LogOutput {
    /// Whether this output needs a `[file]` section
    pub fn uses_file(&self) -> bool {
        matches!(self, Self::File | Self::Both)
    }
}

/// Timestamp rendering for log records
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    /// RFC 3339 in local time (default)
    #[default]
    Rfc3339,
    /// No timestamp
    None,
    /// Custom strftime pattern, e.g. "%Y-%m-%d %H:%M:%S"
    #[serde(untagged)]
    Custom(String),
}

/// Time unit for file rotation
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationInterval {
    /// Only rotate on size
    None,
    /// Rotate every day (default)
    #[default]
    Daily,
    /// Rotate every hour
    Hourly,
    /// Rotate every minute
    Minutely,
}

/// What a size-triggered rotation does within the same time slot
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SizeRollover {
    /// Move the full file to a numbered backup (default)
    #[default]
    Numbered,
    /// Reopen the same file
    Reopen,
}

/// Rotating file output
///
/// # Example
///
/// ```toml
/// [log.file]
/// path = "logs/app.log"
/// rotation = "hourly"
/// max_size_mb = 100
/// max_backups = 7
/// max_age_days = 30
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    /// Base file path; the time slot is inserted before the extension
    pub path: String,

    /// Rotation interval (none, daily, hourly, minutely)
    /// Default: daily
    pub rotation: RotationInterval,

    /// Rotate when the file reaches this size (0 = never)
    /// Default: 0
    pub max_size_mb: u64,

    /// Size rollover behavior (numbered, reopen)
    /// Default: numbered
    pub size_rollover: SizeRollover,

    /// Backups to keep, for external pruning
    pub max_backups: usize,

    /// Days to keep backups, for external pruning
    pub max_age_days: u32,

    /// Accepted for compatibility; rotated files are never compressed
    pub compress: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            rotation: RotationInterval::Daily,
            max_size_mb: 0,
            size_rollover: SizeRollover::Numbered,
            max_backups: 0,
            max_age_days: 0,
            compress: false,
        }
    }
}

impl FileConfig {
    /// Size threshold in bytes
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Logging configuration
///
/// # Example
///
/// ```toml
/// [log]
/// level = "info"
/// format = "json"
/// output = "both"
/// timestamp = "rfc3339"
///
/// [log.file]
/// path = "logs/app.log"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    /// Default: info
    pub level: LogLevel,

    /// Output format (console, json)
    /// Default: console
    pub format: LogFormat,

    /// Output destination (stdout, stderr, file, both)
    /// Default: stdout
    pub output: LogOutput,

    /// Timestamp format (rfc3339, none, or a strftime pattern)
    /// Default: rfc3339
    pub timestamp: TimestampFormat,

    /// Colored output
    /// Default: false
    pub ansi: bool,

    /// Include the event target
    /// Default: true
    pub target: bool,

    /// Include source file and line
    /// Default: false
    pub caller: bool,

    /// Include thread ids
    /// Default: false
    pub thread_ids: bool,

    /// Rotating file output, required for `file` and `both`
    pub file: Option<FileConfig>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Console,
            output: LogOutput::Stdout,
            timestamp: TimestampFormat::Rfc3339,
            ansi: false,
            target: true,
            caller: false,
            thread_ids: false,
            file: None,
        }
    }
}

impl LogConfig {
    /// File output when the destination uses it
    pub fn file_output(&self) -> Option<&FileConfig> {
        if self.output.uses_file() {
            self.file.as_ref()
        } else {
            None
        }
    }
}
