//! logroll - Logging
//!
//! Logger facade over `tracing`, writing through rotating file sinks.
//!
//! # Overview
//!
//! - [`Logger`]: one configured logger (level, format, output)
//! - [`LoggerRegistry`]: named loggers built from `[log]` and `[loggers.*]`
//! - [`init_global`]: install a logger as the process-wide `tracing` default
//! - [`QueryLogger`]: SQL trace records (errors, slow queries, every query)
//!
//! Rotation is invisible here: the logger hands each formatted record to
//! its sink and the sink decides which file it lands in.
//!
//! # Example
//!
//! ```no_run
//! use logroll_config::{FileConfig, LogConfig, LogOutput};
//! use logroll_logging::Logger;
//!
//! let config = LogConfig {
//!     output: LogOutput::File,
//!     file: Some(FileConfig {
//!         path: "logs/app.log".into(),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! };
//!
//! let logger = Logger::new("app", &config)?;
//! logger.info("service started", &[("port", &8080)]);
//! logger.close()?;
//! # Ok::<(), logroll_logging::LoggerError>(())
//! ```

mod error;
mod logger;
mod query_logger;
mod registry;

use logroll_config::LogConfig;

pub use error::{LoggerError, Result};
pub use logger::{Field, Logger, rotation_policy};
pub use query_logger::{
    DEFAULT_SLOW_THRESHOLD, ErrorFilter, QueryLevel, QueryLogger, QueryRecord,
};
pub use registry::LoggerRegistry;

/// Build a logger and install it as the global `tracing` dispatcher
///
/// Returns the logger so the caller can reach its sink and close it on
/// shutdown. Fails if a global dispatcher is already set.
pub fn init_global(config: &LogConfig) -> Result<std::sync::Arc<Logger>> {
    let logger = std::sync::Arc::new(Logger::new(logroll_config::DEFAULT_LOGGER, config)?);
    tracing::dispatcher::set_global_default(logger.dispatch().clone())?;
    Ok(logger)
}
