//! SQL trace logging
//!
//! [`QueryLogger`] turns timed database calls into records on a [`Logger`].
//! Each traced call produces at most one record, picked in this order:
//!
//! ```text
//! error, unless ignored      ──► ERROR "SQL error"  sql rows elapsed error
//! elapsed > slow_threshold   ──► WARN  "slow SQL"   sql rows elapsed threshold_ms
//! level is Info              ──► INFO  "SQL"        sql rows elapsed
//! ```
//!
//! Console loggers get the details folded into the message; json loggers
//! get them as fields.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//! use logroll_logging::{Logger, QueryLevel, QueryLogger};
//!
//! let queries = QueryLogger::new(Arc::new(Logger::stdout("db")))
//!     .with_level(QueryLevel::Info)
//!     .with_slow_threshold(Duration::from_millis(100));
//!
//! let begin = Instant::now();
//! // ... run the query ...
//! queries.trace(begin, "SELECT * FROM users", 3, None);
//! ```

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use logroll_config::LogFormat;

use crate::logger::{Field, Logger};

#[cfg(test)]
#[path = "query_logger_test.rs"]
mod tests;

/// Queries slower than this are reported by default
pub const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_millis(200);

/// Which query records get emitted
///
/// Levels are ordered: each one includes everything below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum QueryLevel {
    /// Nothing
    Silent,
    /// Failed queries only
    Error,
    /// Failed and slow queries
    #[default]
    Warn,
    /// Every query
    Info,
}

/// The record a traced query produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryRecord {
    Error,
    Slow,
    Query,
}

/// Decides whether a query error is expected and should not be reported
pub type ErrorFilter = fn(&(dyn Error + 'static)) -> bool;

/// SQL trace logger on top of a [`Logger`]
#[derive(Clone)]
pub struct QueryLogger {
    logger: Arc<Logger>,
    level: QueryLevel,
    slow_threshold: Duration,
    ignore: Option<ErrorFilter>,
}

impl QueryLogger {
    /// Warn level, 200ms slow threshold, no ignored errors
    pub fn new(logger: Arc<Logger>) -> Self {
        Self {
            logger,
            level: QueryLevel::default(),
            slow_threshold: DEFAULT_SLOW_THRESHOLD,
            ignore: None,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: QueryLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }

    /// Skip the error record for errors matching `filter`
    ///
    /// Typically a "record not found" check. A matching query is still
    /// subject to the slow and info tiers.
    #[must_use]
    pub fn with_ignored_error(mut self, filter: ErrorFilter) -> Self {
        self.ignore = Some(filter);
        self
    }

    pub fn level(&self) -> QueryLevel {
        self.level
    }

    pub fn slow_threshold(&self) -> Duration {
        self.slow_threshold
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    pub fn info(&self, msg: &str, fields: &[Field<'_>]) {
        if self.level >= QueryLevel::Info {
            self.logger.info(msg, fields);
        }
    }

    pub fn warn(&self, msg: &str, fields: &[Field<'_>]) {
        if self.level >= QueryLevel::Warn {
            self.logger.warn(msg, fields);
        }
    }

    pub fn error(&self, msg: &str, fields: &[Field<'_>]) {
        if self.level >= QueryLevel::Error {
            self.logger.error(msg, fields);
        }
    }

    /// Record a query that started at `begin`
    ///
    /// Returns which record was written, if any.
    pub fn trace(
        &self,
        begin: Instant,
        sql: &str,
        rows: i64,
        err: Option<&(dyn Error + 'static)>,
    ) -> Option<QueryRecord> {
        self.record(begin.elapsed(), sql, rows, err)
    }

    fn record(
        &self,
        elapsed: Duration,
        sql: &str,
        rows: i64,
        err: Option<&(dyn Error + 'static)>,
    ) -> Option<QueryRecord> {
        if self.level == QueryLevel::Silent {
            return None;
        }

        let console = self.logger.format() == LogFormat::Console;
        let took = Elapsed(elapsed);

        match err {
            Some(err) if self.level >= QueryLevel::Error && !self.is_ignored(err) => {
                if console {
                    let msg = format!("SQL error: {err} [{took}] [rows: {rows}] {sql}");
                    self.logger.error(&msg, &[]);
                } else {
                    let fields: [Field<'_>; 4] = [
                        ("sql", &sql),
                        ("rows", &rows),
                        ("elapsed", &took),
                        ("error", &err),
                    ];
                    self.logger.error("SQL error", &fields);
                }
                Some(QueryRecord::Error)
            }
            _ if elapsed > self.slow_threshold && self.level >= QueryLevel::Warn => {
                let threshold = Elapsed(self.slow_threshold);
                if console {
                    let msg = format!("slow SQL > {threshold} [{took}] [rows: {rows}] {sql}");
                    self.logger.warn(&msg, &[]);
                } else {
                    let threshold_ms = self.slow_threshold.as_secs_f64() * 1000.0;
                    let fields: [Field<'_>; 4] = [
                        ("sql", &sql),
                        ("rows", &rows),
                        ("elapsed", &took),
                        ("threshold_ms", &threshold_ms),
                    ];
                    self.logger.warn("slow SQL", &fields);
                }
                Some(QueryRecord::Slow)
            }
            _ if self.level == QueryLevel::Info => {
                if console {
                    let msg = format!("SQL [{took}] [rows: {rows}] {sql}");
                    self.logger.info(&msg, &[]);
                } else {
                    let fields: [Field<'_>; 3] =
                        [("sql", &sql), ("rows", &rows), ("elapsed", &took)];
                    self.logger.info("SQL", &fields);
                }
                Some(QueryRecord::Query)
            }
            _ => None,
        }
    }

    fn is_ignored(&self, err: &(dyn Error + 'static)) -> bool {
        self.ignore.is_some_and(|filter| filter(err))
    }
}

impl fmt::Debug for QueryLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryLogger")
            .field("logger", &self.logger.name())
            .field("level", &self.level)
            .field("slow_threshold", &self.slow_threshold)
            .finish_non_exhaustive()
    }
}

/// Durations as `300ms`, `1.5s`
struct Elapsed(Duration);

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
