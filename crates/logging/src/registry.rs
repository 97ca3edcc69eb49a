//! Named logger registry
//!
//! Maps logger names to shared [`Logger`] instances so components can look
//! up their logger by the name used in `[loggers.<name>]`.
//!
//! # Example
//!
//! ```no_run
//! use logroll_config::Config;
//! use logroll_logging::LoggerRegistry;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[loggers.audit]\nlevel = \"debug\"")?;
//! let registry = LoggerRegistry::from_config(&config)?;
//!
//! let audit = registry.get_or_default("audit");
//! audit.info("user logged in", &[("user", &"alice")]);
//!
//! registry.close_all()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use logroll_config::{Config, DEFAULT_LOGGER, LogConfig};
use parking_lot::RwLock;

use crate::error::Result;
use crate::logger::Logger;

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;

/// Registry of named loggers
///
/// Lookups of unknown names fall back to `default`, or to a stdout logger
/// when nothing is registered under that name either.
pub struct LoggerRegistry {
    loggers: RwLock<HashMap<String, Arc<Logger>>>,
    fallback: Arc<Logger>,
}

impl LoggerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            loggers: RwLock::new(HashMap::new()),
            fallback: Arc::new(Logger::stdout(DEFAULT_LOGGER)),
        }
    }

    /// Build a registry holding `[log]` as `default` plus every `[loggers.*]`
    ///
    /// Loggers opened before a failure are closed again.
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = Self::new();
        for (name, log) in config.all_loggers() {
            if let Err(e) = registry.init(name, log) {
                // the init error is the one worth reporting
                let _ = registry.close_all();
                return Err(e);
            }
        }
        Ok(registry)
    }

    /// Build a logger and register it under `name`
    ///
    /// A logger previously registered under the same name is closed.
    pub fn init(&self, name: &str, config: &LogConfig) -> Result<Arc<Logger>> {
        let logger = Arc::new(Logger::new(name, config)?);
        if let Some(previous) = self.replace(name, Arc::clone(&logger)) {
            close_replaced(&previous);
        }
        Ok(logger)
    }

    /// Logger registered under `name`
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.read().get(name).cloned()
    }

    /// Logger registered under `name`, or the fallback
    ///
    /// The fallback is the registered `default` logger when there is one,
    /// otherwise a stdout logger.
    pub fn get_or_default(&self, name: &str) -> Arc<Logger> {
        let loggers = self.loggers.read();
        loggers
            .get(name)
            .or_else(|| loggers.get(DEFAULT_LOGGER))
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    /// Register `logger` under `name`, returning the one it replaces
    ///
    /// The replaced logger is left open; its owner decides when to close it.
    pub fn replace(&self, name: &str, logger: Arc<Logger>) -> Option<Arc<Logger>> {
        self.loggers.write().insert(name.to_string(), logger)
    }

    /// Unregister `name` without closing it
    pub fn remove(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.write().remove(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.loggers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.read().is_empty()
    }

    /// Close every registered logger
    ///
    /// Keeps going past failures and returns the first one.
    pub fn close_all(&self) -> Result<()> {
        let loggers: Vec<Arc<Logger>> = self.loggers.read().values().cloned().collect();

        let mut first_err = None;
        for logger in loggers {
            if let Err(e) = logger.close() {
                tracing::warn!(logger = logger.name(), error = %e, "failed to close logger");
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("loggers", &self.names())
            .finish_non_exhaustive()
    }
}

fn close_replaced(logger: &Logger) {
    if let Err(e) = logger.close() {
        tracing::warn!(logger = logger.name(), error = %e, "failed to close replaced logger");
    }
}
