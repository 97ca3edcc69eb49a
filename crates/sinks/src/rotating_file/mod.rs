//! Rotating File Sink - blocking append with time and size rotation
//!
//! Serializes record bytes into a sequence of files. The active file is
//! named after the current time slot; it is swapped when the slot ends or
//! when the bytes written to it cross a threshold.
//!
//! # Rotation Decision
//!
//! Evaluated once per `write`, before appending:
//!
//! ```text
//! now >= next_boundary ──yes──► path changed? ──yes──► reopen at new path
//!        │                           └──no──► advance boundary only
//!        no
//!        ▼
//! no file open ──yes──► reopen (retry after a failed rotation)
//!        │
//!        no
//!        ▼
//! size >= max_size ──yes──► roll over (numbered backup or plain reopen)
//! ```
//!
//! # Concurrency
//!
//! Every public method holds one mutex for its whole body, IO included.
//! Writes never interleave across a rotation and `current_size` always
//! equals the bytes committed to the open file.
//!
//! # Directory Structure
//!
//! ```text
//! logs/
//! ├── app_2025-01-15_09.log     # previous slot
//! ├── app_2025-01-15_10.1.log   # size rollover backup
//! └── app_2025-01-15_10.log     # active
//! ```

mod clock;
mod policy;

pub use clock::{Clock, SystemClock};

#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;
pub use policy::{RotationPolicy, SizeRollover, TimeGranularity, compute_path, split_extension};

use std::ffi::{OsStr, OsString};
use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::Mutex;

use crate::error::{Result, RotateError};
use policy::numbered_path;

/// Why a rotation happened (for logging)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Time,
    Size,
    Forced,
    Retry,
}

impl Trigger {
    fn as_str(&self) -> &'static str {
        match self {
            Trigger::Time => "time",
            Trigger::Size => "size",
            Trigger::Forced => "forced",
            Trigger::Retry => "retry",
        }
    }
}

/// The open file and the path it was opened at
struct ActiveFile {
    file: File,
    path: PathBuf,
}

/// Mutable writer state, only touched under the lock
#[derive(Default)]
struct WriterState {
    active: Option<ActiveFile>,
    current_size: u64,
    next_boundary: Option<NaiveDateTime>,
    closed: bool,
    /// Stem and number of the last numbered backup written
    last_backup: Option<(PathBuf, u32)>,
}

impl WriterState {
    fn active_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|active| active.path.as_path())
    }
}

/// Rotating file writer
///
/// Owns at most one open file. Safe to share between producer threads as
/// `Arc<RotatingWriter>`; `&RotatingWriter` implements [`io::Write`], so the
/// `Arc` can be handed to anything that wants a writer factory.
pub struct RotatingWriter {
    /// Immutable configuration
    policy: RotationPolicy,

    /// Base path with the extension stripped
    prefix: PathBuf,

    /// Dotted extension of the base path (may be empty)
    extension: OsString,

    /// Time source
    clock: Arc<dyn Clock>,

    /// Open file, byte count, next boundary
    state: Mutex<WriterState>,
}

impl RotatingWriter {
    /// Create a writer on the system clock and open the first file
    ///
    /// # Errors
    ///
    /// Fails if the parent directory cannot be created or the file cannot
    /// be opened. No writer is returned in that case.
    pub fn new(policy: RotationPolicy) -> Result<Self> {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    /// Create a writer with an explicit time source
    pub fn with_clock(policy: RotationPolicy, clock: Arc<dyn Clock>) -> Result<Self> {
        let (prefix, extension) = split_extension(&policy.base_path);

        if policy.compress {
            tracing::warn!(
                path = %policy.base_path.display(),
                "compression of rotated files is not supported, ignoring compress"
            );
        }

        let writer = Self {
            policy,
            prefix,
            extension,
            clock,
            state: Mutex::new(WriterState::default()),
        };

        {
            let now = writer.clock.now();
            let mut state = writer.state.lock();
            writer.open_at(&mut state, now)?;
        }

        Ok(writer)
    }

    /// Append `buf` to the active file, rotating first if needed
    ///
    /// Returns the number of bytes written, which is always `buf.len()` on
    /// success. On failure `current_size` still accounts for any prefix of
    /// `buf` that reached the file.
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(RotateError::Closed);
        }

        let now = self.clock.now();
        self.check_rotation(&mut state, now)?;

        let Some(active) = state.active.as_mut() else {
            return Err(RotateError::NotOpen);
        };

        let mut written = 0;
        let result = loop {
            if written == buf.len() {
                break Ok(());
            }
            match active.file.write(&buf[written..]) {
                Ok(0) => break Err(io::Error::from(io::ErrorKind::WriteZero)),
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(e),
            }
        };

        state.current_size += written as u64;
        result.map(|()| written).map_err(RotateError::Write)
    }

    /// Sync the active file to durable storage
    ///
    /// No-op when no file is open.
    pub fn flush(&self) -> Result<()> {
        let state = self.state.lock();
        match state.active.as_ref() {
            Some(active) => active.file.sync_all().map_err(RotateError::Sync),
            None => Ok(()),
        }
    }

    /// Release the active file and mark the writer closed
    ///
    /// Idempotent. A sync failure is reported once; the handle is released
    /// regardless.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.closed = true;
        state.next_boundary = None;

        let Some(active) = state.active.take() else {
            return Ok(());
        };

        let result = active.file.sync_all().map_err(RotateError::Sync);
        tracing::debug!(path = %active.path.display(), "closed log file");
        result
    }

    /// Rotate now, regardless of time and size thresholds
    ///
    /// Opens the file for the current instant. Within an unchanged time slot
    /// the size rollover rule applies (numbered backup or plain reopen).
    pub fn force_rotate(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(RotateError::Closed);
        }

        let now = self.clock.now();
        self.roll_over(&mut state, now, Trigger::Forced)
    }

    /// Path of the open file, `None` when nothing is open
    pub fn current_path(&self) -> Option<PathBuf> {
        self.state.lock().active_path().map(Path::to_path_buf)
    }

    /// Path of the open file as a string, empty when nothing is open
    pub fn current_path_string(&self) -> String {
        self.current_path()
            .map(|path| path.display().to_string())
            .unwrap_or_default()
    }

    /// Bytes written to the open file, including what was on disk at open
    pub fn current_size(&self) -> u64 {
        self.state.lock().current_size
    }

    /// Instant at which the next time-based rotation is evaluated
    pub fn next_boundary(&self) -> Option<NaiveDateTime> {
        self.state.lock().next_boundary
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Active path for `now` under this writer's policy
    pub fn path_for(&self, now: NaiveDateTime) -> PathBuf {
        compute_path(now, self.policy.granularity, &self.prefix, &self.extension)
    }

    fn check_rotation(&self, state: &mut WriterState, now: NaiveDateTime) -> Result<()> {
        if state.next_boundary.is_some_and(|boundary| now >= boundary) {
            let path = self.path_for(now);
            if state.active_path() == Some(path.as_path()) {
                // Boundary passed but the slot name did not change
                state.next_boundary = self.policy.granularity.next_boundary(now);
                return Ok(());
            }
            return self.reopen(state, now, Trigger::Time);
        }

        if state.active.is_none() {
            return self.reopen(state, now, Trigger::Retry);
        }

        if self.policy.max_size_bytes > 0 && state.current_size >= self.policy.max_size_bytes {
            return self.roll_over(state, now, Trigger::Size);
        }

        Ok(())
    }

    /// Roll over within the current slot, archiving the active file first
    /// when the policy asks for numbered backups
    fn roll_over(&self, state: &mut WriterState, now: NaiveDateTime, trigger: Trigger) -> Result<()> {
        let path = self.path_for(now);
        let archive = self.policy.size_rollover == SizeRollover::Numbered
            && state.active_path() == Some(path.as_path());

        if archive {
            let size = state.current_size;
            // Release the handle before renaming
            state.active = None;
            let backup = self.archive(state, &path, now)?;
            tracing::info!(
                from = %path.display(),
                to = %backup.display(),
                bytes = size,
                "archived log file"
            );
        }

        self.reopen(state, now, trigger)
    }

    fn reopen(&self, state: &mut WriterState, now: NaiveDateTime, trigger: Trigger) -> Result<()> {
        let previous = state.active.as_ref().map(|active| active.path.clone());
        self.open_at(state, now)?;

        tracing::info!(
            trigger = trigger.as_str(),
            previous = ?previous,
            path = %self.path_for(now).display(),
            "rotated log file"
        );
        Ok(())
    }

    /// Close whatever is open, then open the file for `now`
    ///
    /// On failure the writer is left without a file and the boundary is not
    /// advanced, so the next write retries.
    fn open_at(&self, state: &mut WriterState, now: NaiveDateTime) -> Result<()> {
        state.active = None;

        let path = self.path_for(now);
        let file = open_log_file(&path)?;
        let size = file.metadata().map(|meta| meta.len()).unwrap_or(0);

        tracing::debug!(path = %path.display(), size, "opened log file");

        state.current_size = size;
        state.next_boundary = self.policy.granularity.next_boundary(now);
        state.active = Some(ActiveFile { file, path });
        Ok(())
    }

    /// Rename `path` to the next `<stem>.<n><ext>`
    ///
    /// The first rollover in a slot scans the directory once for the highest
    /// existing number; later ones count up from the cached value, so a new
    /// backup always sorts after older ones even when numbers are missing.
    fn archive(&self, state: &mut WriterState, path: &Path, now: NaiveDateTime) -> Result<PathBuf> {
        let stem = compute_path(now, self.policy.granularity, &self.prefix, OsStr::new(""));
        let last = match &state.last_backup {
            Some((cached, n)) if *cached == stem => *n,
            _ => highest_backup(&stem, &self.extension),
        };

        let Some(n) = last.checked_add(1) else {
            return Err(RotateError::Archive {
                from: path.to_path_buf(),
                to: stem,
                source: io::Error::other("no free backup number"),
            });
        };
        let backup = numbered_path(&stem, n, &self.extension);

        fs::rename(path, &backup).map_err(|source| RotateError::Archive {
            from: path.to_path_buf(),
            to: backup.clone(),
            source,
        })?;
        state.last_backup = Some((stem, n));
        Ok(backup)
    }
}

impl std::fmt::Debug for RotatingWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingWriter")
            .field("policy", &self.policy)
            .field("current_path", &self.current_path())
            .finish()
    }
}

/// Highest `n` among existing `<stem>.<n><ext>` files, 0 when there are none
fn highest_backup(stem: &Path, extension: &OsStr) -> u32 {
    let (Some(stem), Some(extension)) = (stem.to_str(), extension.to_str()) else {
        return 0;
    };
    // the stem may end in a separator when the base name is a dot-file
    let (dir, stem_name) = match stem.rfind(std::path::is_separator) {
        Some(i) => (&stem[..=i], &stem[i + 1..]),
        None => (".", stem),
    };
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name();
            let number = name
                .to_str()?
                .strip_prefix(stem_name)?
                .strip_prefix('.')?
                .strip_suffix(extension)?
                .parse::<u32>()
                .ok()?;
            Some(number)
        })
        .max()
        .unwrap_or(0)
}

/// Open `path` for appending, creating missing parent directories
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        create_log_dir(dir).map_err(|source| RotateError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    options.open(path).map_err(|source| RotateError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// `mkdir -p` with rwxr-xr-x
fn create_log_dir(dir: &Path) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir)
}

impl Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        RotatingWriter::write(self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        RotatingWriter::flush(self).map_err(Into::into)
    }
}

impl Write for &RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        RotatingWriter::write(self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        RotatingWriter::flush(self).map_err(Into::into)
    }
}
