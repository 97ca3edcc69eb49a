//! Logger facade
//!
//! A [`Logger`] owns a `tracing` dispatcher built from a [`LogConfig`]. When
//! the configured output includes a file, the dispatcher writes through a
//! shared [`RotatingWriter`]: every formatted record becomes one `write`
//! call, so rotation happens between records and never splits one.
//!
//! ```text
//! logger.info("msg", fields)
//!     │
//!     ▼
//! [Dispatch: EnvFilter + fmt layer (console | json)]
//!     │
//!     ├──► stdout / stderr
//!     └──► Arc<RotatingWriter> ──► logs/app_2025-01-15.log
//! ```

use std::fmt;
use std::sync::Arc;

use logroll_config::{
    FileConfig, LogConfig, LogFormat, LogLevel, LogOutput, RotationInterval, SizeRollover,
    TimestampFormat,
};
use logroll_sinks::{self as sinks, RotatingWriter, RotationPolicy, TimeGranularity};
use tracing::level_filters::LevelFilter;
use tracing::{Dispatch, Level, Subscriber, dispatcher};
use tracing_subscriber::fmt::time::{ChronoLocal, FormatTime};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt as tfmt};

use crate::error::{LoggerError, Result};

/// A structured field passed alongside a message
pub type Field<'a> = (&'a str, &'a dyn fmt::Display);

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

// event levels must be constant at the callsite
macro_rules! emit {
    ($logger:ident, $level:expr, $msg:ident, $fields:ident) => {{
        let fields = Fields($fields);
        let name = $logger.name.as_str();
        dispatcher::with_default(&$logger.dispatch, || {
            if fields.0.is_empty() {
                tracing::event!($level, logger = name, "{}", $msg)
            } else {
                tracing::event!($level, logger = name, fields = %fields, "{}", $msg)
            }
        })
    }};
}

/// A named logger
pub struct Logger {
    name: String,
    format: LogFormat,
    dispatch: Dispatch,
    sink: Option<Arc<RotatingWriter>>,
}

impl Logger {
    /// Build a logger from its configuration
    ///
    /// Opens the rotating file right away when the output includes one, so a
    /// bad path fails here rather than on the first record.
    pub fn new(name: impl Into<String>, config: &LogConfig) -> Result<Self> {
        let name = name.into();

        let sink = if config.output.uses_file() {
            let file = config
                .file
                .as_ref()
                .ok_or_else(|| LoggerError::MissingFile { name: name.clone() })?;
            Some(Arc::new(RotatingWriter::new(rotation_policy(file))?))
        } else {
            None
        };

        Ok(Self::with_sink(name, config, sink))
    }

    /// Build a logger around an existing sink
    ///
    /// `sink` replaces the file half of the output; with `None` a file
    /// output falls back to stdout.
    pub fn with_sink(
        name: impl Into<String>,
        config: &LogConfig,
        sink: Option<Arc<RotatingWriter>>,
    ) -> Self {
        let writer = make_writer(config.output, sink.as_ref());

        // escape codes only make sense on a terminal
        let ansi = config.ansi && !config.output.uses_file();

        let layer: BoxedLayer<Registry> = match &config.timestamp {
            TimestampFormat::Rfc3339 => fmt_layer(config, ansi, writer, ChronoLocal::rfc_3339()),
            TimestampFormat::Custom(pattern) => {
                fmt_layer(config, ansi, writer, ChronoLocal::new(pattern.clone()))
            }
            TimestampFormat::None => fmt_layer(config, ansi, writer, ()),
        };

        let filter = EnvFilter::default().add_directive(level_filter(config.level).into());
        let subscriber = tracing_subscriber::registry().with(layer).with(filter);

        Self {
            name: name.into(),
            format: config.format,
            dispatch: Dispatch::new(subscriber),
            sink,
        }
    }

    /// Stdout logger with default settings
    pub fn stdout(name: impl Into<String>) -> Self {
        Self::with_sink(name, &LogConfig::default(), None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record format, console or json
    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn debug(&self, msg: &str, fields: &[Field<'_>]) {
        emit!(self, Level::DEBUG, msg, fields);
    }

    pub fn info(&self, msg: &str, fields: &[Field<'_>]) {
        emit!(self, Level::INFO, msg, fields);
    }

    pub fn warn(&self, msg: &str, fields: &[Field<'_>]) {
        emit!(self, Level::WARN, msg, fields);
    }

    pub fn error(&self, msg: &str, fields: &[Field<'_>]) {
        emit!(self, Level::ERROR, msg, fields);
    }

    /// Run `f` with this logger as the default dispatcher
    ///
    /// `tracing` macros inside the closure go through this logger.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        dispatcher::with_default(&self.dispatch, f)
    }

    /// The underlying dispatcher
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// The rotating file sink, if the output includes one
    pub fn sink(&self) -> Option<Arc<RotatingWriter>> {
        self.sink.clone()
    }

    /// Flush and close the rotating sink
    ///
    /// The sink is closed even when the flush fails; the first error is
    /// returned. Records logged afterwards to the file half of the output
    /// are dropped.
    pub fn close(&self) -> Result<()> {
        let Some(sink) = &self.sink else {
            return Ok(());
        };
        let flushed = sink.flush();
        let closed = sink.close();
        flushed?;
        closed?;
        Ok(())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

/// Renders fields as `key=value` pairs separated by spaces
struct Fields<'a, 'b>(&'a [Field<'b>]);

impl fmt::Display for Fields<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// Rotation policy for a `[file]` section
pub fn rotation_policy(file: &FileConfig) -> RotationPolicy {
    let granularity = match file.rotation {
        RotationInterval::None => TimeGranularity::None,
        RotationInterval::Daily => TimeGranularity::Daily,
        RotationInterval::Hourly => TimeGranularity::Hourly,
        RotationInterval::Minutely => TimeGranularity::Minutely,
    };
    let size_rollover = match file.size_rollover {
        SizeRollover::Numbered => sinks::SizeRollover::Numbered,
        SizeRollover::Reopen => sinks::SizeRollover::Reopen,
    };

    RotationPolicy::new(&file.path)
        .with_granularity(granularity)
        .with_max_size_bytes(file.max_size_bytes())
        .with_size_rollover(size_rollover)
        .with_max_backups(file.max_backups)
        .with_max_age_days(file.max_age_days)
        .with_compress(file.compress)
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    }
}

fn make_writer(output: LogOutput, sink: Option<&Arc<RotatingWriter>>) -> BoxMakeWriter {
    match (output, sink) {
        (LogOutput::Stderr, _) => BoxMakeWriter::new(std::io::stderr),
        (LogOutput::File, Some(sink)) => BoxMakeWriter::new(Arc::clone(sink)),
        (LogOutput::Both, Some(sink)) => BoxMakeWriter::new(std::io::stdout.and(Arc::clone(sink))),
        _ => BoxMakeWriter::new(std::io::stdout),
    }
}

fn fmt_layer<S, T>(config: &LogConfig, ansi: bool, writer: BoxMakeWriter, timer: T) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    T: FormatTime + Send + Sync + 'static,
{
    let layer = tfmt::layer()
        .with_writer(writer)
        .with_timer(timer)
        .with_ansi(ansi)
        .with_target(config.target)
        .with_file(config.caller)
        .with_line_number(config.caller)
        .with_thread_ids(config.thread_ids);

    match config.format {
        LogFormat::Console => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

#[cfg(test)]
#[path = "logger_test.rs"]
mod logger_test;
