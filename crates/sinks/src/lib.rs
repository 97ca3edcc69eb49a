//! logroll - Sinks
//!
//! File sinks for the logroll logging pipeline.
//!
//! # Architecture
//!
//! A logger facade formats records and hands the encoded bytes to a sink.
//! The sink decides where those bytes land on disk; the facade never sees
//! a rotation happen.
//!
//! ```text
//! [Logger] --bytes--> [RotatingWriter] --> app_2025-01-15_10.log
//!                           ↓ (boundary or size)
//!                      app_2025-01-15_11.log
//! ```
//!
//! # Available Sinks
//!
//! | Sink | Purpose | Rotation |
//! |------|---------|----------|
//! | `rotating_file` | Blocking append with time/size rotation | Yes |
//!
//! # Example
//!
//! ```no_run
//! use logroll_sinks::{RotatingWriter, RotationPolicy, TimeGranularity};
//!
//! let policy = RotationPolicy::new("logs/app.log")
//!     .with_granularity(TimeGranularity::Hourly)
//!     .with_max_size_bytes(64 * 1024 * 1024);
//!
//! let writer = RotatingWriter::new(policy)?;
//! writer.write(b"service started\n")?;
//! writer.flush()?;
//! writer.close()?;
//! # Ok::<(), logroll_sinks::RotateError>(())
//! ```

/// Rotating file sink - one open file, rotated on time boundaries or size
pub mod rotating_file;

/// Error types for sink operations
mod error;

pub use error::{Result, RotateError};
pub use rotating_file::{
    Clock, RotatingWriter, RotationPolicy, SizeRollover, SystemClock, TimeGranularity,
    compute_path, split_extension,
};

/// Settable clock for driving rotation in tests
#[cfg(any(test, feature = "test-util"))]
pub use rotating_file::ManualClock;
