//! Rotation policy and file naming
//!
//! File names are a pure function of the wall-clock instant and the policy:
//!
//! ```text
//! base path:  logs/app.log
//! daily:      logs/app_2025-01-15.log
//! hourly:     logs/app_2025-01-15_10.log
//! minutely:   logs/app_2025-01-15_10_42.log
//! none:       logs/app.log
//! ```

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};

/// Time unit at which the rotation boundary recurs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeGranularity {
    /// No time-based rotation, the base path is used verbatim
    None,
    /// Rotate at midnight (default)
    #[default]
    Daily,
    /// Rotate at the top of every hour
    Hourly,
    /// Rotate at the start of every minute
    Minutely,
}

impl TimeGranularity {
    /// Get the date format string for this granularity
    fn date_format(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Daily => Some("%Y-%m-%d"),
            Self::Hourly => Some("%Y-%m-%d_%H"),
            Self::Minutely => Some("%Y-%m-%d_%H_%M"),
        }
    }

    /// Time token embedded in file names for `now`
    pub fn time_token(&self, now: NaiveDateTime) -> Option<String> {
        self.date_format().map(|fmt| now.format(fmt).to_string())
    }

    /// Start of the unit following the one that contains `now`
    ///
    /// Returns `None` for [`TimeGranularity::None`].
    pub fn next_boundary(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Self::None => None,
            Self::Daily => now.date().succ_opt().map(|day| day.and_time(NaiveTime::MIN)),
            Self::Hourly => now
                .date()
                .and_hms_opt(now.hour(), 0, 0)?
                .checked_add_signed(TimeDelta::hours(1)),
            Self::Minutely => now
                .date()
                .and_hms_opt(now.hour(), now.minute(), 0)?
                .checked_add_signed(TimeDelta::minutes(1)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Hourly => "hourly",
            Self::Minutely => "minutely",
        }
    }
}

/// What a size-triggered rotation does within an unchanged time slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SizeRollover {
    /// Rename the active file to `<stem>.<n><ext>` and start a fresh one
    #[default]
    Numbered,
    /// Close and reopen the same path, appending to what is already there
    Reopen,
}

/// Configuration for a rotating writer
///
/// `max_backups`, `max_age_days` and `compress` are carried for whoever
/// prunes old files; the writer itself never reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Base path, e.g. `logs/app.log`
    pub base_path: PathBuf,

    /// Time-based rotation unit
    pub granularity: TimeGranularity,

    /// Rotate once this many bytes were written (0 = never)
    pub max_size_bytes: u64,

    /// Behavior of size-triggered and forced rotations
    pub size_rollover: SizeRollover,

    /// Maximum number of backups to keep (not enforced)
    pub max_backups: usize,

    /// Maximum age of backups in days (not enforced)
    pub max_age_days: u32,

    /// Compress rotated files (not implemented)
    pub compress: bool,
}

impl RotationPolicy {
    /// Create a daily policy with size rotation disabled
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            granularity: TimeGranularity::Daily,
            max_size_bytes: 0,
            size_rollover: SizeRollover::Numbered,
            max_backups: 0,
            max_age_days: 0,
            compress: false,
        }
    }

    #[must_use]
    pub fn with_granularity(mut self, granularity: TimeGranularity) -> Self {
        self.granularity = granularity;
        self
    }

    #[must_use]
    pub fn with_max_size_bytes(mut self, max_size_bytes: u64) -> Self {
        self.max_size_bytes = max_size_bytes;
        self
    }

    #[must_use]
    pub fn with_size_rollover(mut self, size_rollover: SizeRollover) -> Self {
        self.size_rollover = size_rollover;
        self
    }

    #[must_use]
    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }

    #[must_use]
    pub fn with_max_age_days(mut self, max_age_days: u32) -> Self {
        self.max_age_days = max_age_days;
        self
    }

    #[must_use]
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// Split a base path into its prefix and dotted extension
///
/// The extension starts at the last `.` of the file name: `logs/app.log`
/// becomes (`logs/app`, `.log`) and a dot-file such as `logs/.hidden` becomes
/// (`logs/`, `.hidden`). A name without a dot keeps the full path as the
/// prefix and gets an empty extension. Non UTF-8 names fall back to
/// [`Path::extension`].
pub fn split_extension(base: &Path) -> (PathBuf, OsString) {
    let Some(name) = base.file_name().and_then(OsStr::to_str) else {
        return split_os_extension(base);
    };

    match name.rfind('.') {
        Some(dot) => {
            let (stem, ext) = name.split_at(dot);
            (base.with_file_name(stem), OsString::from(ext))
        }
        None => (base.to_path_buf(), OsString::new()),
    }
}

fn split_os_extension(base: &Path) -> (PathBuf, OsString) {
    match base.extension() {
        Some(ext) => {
            let mut dotted = OsString::from(".");
            dotted.push(ext);
            (base.with_extension(""), dotted)
        }
        None => (base.to_path_buf(), OsString::new()),
    }
}

/// Path of the active file for `now`
///
/// `prefix + "_" + token + extension`, or `prefix + extension` when the
/// granularity is [`TimeGranularity::None`].
pub fn compute_path(
    now: NaiveDateTime,
    granularity: TimeGranularity,
    prefix: &Path,
    extension: &OsStr,
) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    if let Some(token) = granularity.time_token(now) {
        name.push("_");
        name.push(token);
    }
    name.push(extension);
    PathBuf::from(name)
}

/// Numbered backup path: `<stem>.<n><extension>`
pub(crate) fn numbered_path(stem: &Path, n: u32, extension: &OsStr) -> PathBuf {
    let mut name = stem.as_os_str().to_os_string();
    name.push(format!(".{n}"));
    name.push(extension);
    PathBuf::from(name)
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod policy_test;
