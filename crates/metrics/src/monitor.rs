//! Channel depth monitor
//!
//! Periodically reports how many messages sit in named groups of bounded
//! `tokio::sync::mpsc` channels. A growing depth means the consumer side of
//! a pipeline stage is falling behind.
//!
//! ```text
//! group "parse": [ch0, ch1]      every interval:
//! group "write": [ch0]     ──►   WARN channel depth parsech0=3 parsech1=0 writech0=120
//! ```
//!
//! The monitor only holds weak senders. Dropping every strong sender still
//! closes the channel, and closed channels drop out of the report.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use logroll_config::MonitorConfig;
use logroll_logging::{Field, Logger};
use tokio::sync::mpsc::{Sender, WeakSender};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[cfg(test)]
#[path = "monitor_test.rs"]
mod tests;

/// Depth of one monitored channel at snapshot time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDepth {
    /// `<group>ch<index>`
    pub name: String,
    /// Messages currently queued
    pub depth: usize,
    /// Channel capacity
    pub capacity: usize,
}

/// Builder for a [`ChannelMonitor`]
pub struct ChannelMonitorBuilder<T> {
    config: MonitorConfig,
    groups: BTreeMap<String, Vec<WeakSender<T>>>,
    logger: Option<Arc<Logger>>,
}

impl<T> ChannelMonitorBuilder<T> {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: MonitorConfig::default(),
            groups: BTreeMap::new(),
            logger: None,
        }
    }

    /// Set the monitor configuration
    pub fn config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the reporting interval
    ///
    /// A zero interval falls back to the default of one minute.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    /// Append a channel to group `name`
    pub fn channel(mut self, name: impl Into<String>, sender: &Sender<T>) -> Self {
        self.groups
            .entry(name.into())
            .or_default()
            .push(sender.downgrade());
        self
    }

    /// Replace group `name` with `senders`
    pub fn channels(mut self, name: impl Into<String>, senders: &[Sender<T>]) -> Self {
        self.groups
            .insert(name.into(), senders.iter().map(Sender::downgrade).collect());
        self
    }

    /// Report through `logger` instead of the current `tracing` dispatcher
    pub fn logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Build the monitor
    pub fn build(mut self) -> ChannelMonitor<T> {
        if self.config.interval.is_zero() {
            self.config.interval = MonitorConfig::default().interval;
        }
        ChannelMonitor {
            config: self.config,
            groups: self.groups,
            logger: self.logger,
        }
    }
}

impl<T> Default for ChannelMonitorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Reports queue depths of registered channels at a fixed interval
pub struct ChannelMonitor<T> {
    config: MonitorConfig,
    groups: BTreeMap<String, Vec<WeakSender<T>>>,
    logger: Option<Arc<Logger>>,
}

impl<T> ChannelMonitor<T> {
    /// Create a new builder
    pub fn builder() -> ChannelMonitorBuilder<T> {
        ChannelMonitorBuilder::new()
    }

    /// Reporting interval
    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// Depths of all channels that are still open
    ///
    /// Groups come out sorted by name, channels in registration order. The
    /// index in a name is the registration index, so it stays stable when
    /// an earlier channel closes.
    pub fn snapshot(&self) -> Vec<ChannelDepth> {
        let mut depths = Vec::new();
        for (group, senders) in &self.groups {
            for (i, weak) in senders.iter().enumerate() {
                let Some(sender) = weak.upgrade() else {
                    continue;
                };
                let capacity = sender.max_capacity();
                depths.push(ChannelDepth {
                    name: format!("{group}ch{i}"),
                    depth: capacity - sender.capacity(),
                    capacity,
                });
            }
        }
        depths
    }

    /// Report once, skipping empty snapshots
    fn report(&self) {
        let depths = self.snapshot();
        if depths.is_empty() {
            return;
        }

        match &self.logger {
            Some(logger) => {
                let fields: Vec<Field<'_>> = depths
                    .iter()
                    .map(|c| (c.name.as_str(), &c.depth as &dyn fmt::Display))
                    .collect();
                logger.warn("channel depth", &fields);
            }
            None => tracing::warn!(channels = %Depths(&depths), "channel depth"),
        }
    }
}

impl<T: Send + 'static> ChannelMonitor<T> {
    /// Run the monitor until cancellation
    ///
    /// The first report comes one interval after start.
    pub async fn run(self, cancel: CancellationToken) {
        if !self.config.enabled {
            info!("channel monitor disabled");
            return;
        }

        let period = self.config.interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(
            interval_secs = period.as_secs(),
            groups = self.groups.len(),
            "channel monitor started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("channel monitor shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.report();
                }
            }
        }
    }

    /// Spawn the monitor on the current runtime
    pub fn spawn(self) -> MonitorHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(cancel.clone()));
        MonitorHandle { cancel, task }
    }
}

impl<T> fmt::Debug for ChannelMonitor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelMonitor")
            .field("config", &self.config)
            .field("groups", &self.groups.keys().collect::<Vec<_>>())
            .field("logger", &self.logger.as_ref().map(|l| l.name()))
            .finish()
    }
}

/// Handle to a spawned [`ChannelMonitor`]
#[derive(Debug)]
pub struct MonitorHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Ask the monitor to stop; calling it again does nothing
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the monitor task to finish
    pub async fn join(self) -> Result<(), JoinError> {
        self.task.await
    }
}

/// `name=depth` pairs separated by spaces
struct Depths<'a>(&'a [ChannelDepth]);

impl fmt::Display for Depths<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", c.name, c.depth)?;
        }
        Ok(())
    }
}
