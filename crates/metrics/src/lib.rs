//! logroll - Metrics
//!
//! Internal observability for pipelines that log through logroll.
//!
//! # Overview
//!
//! [`ChannelMonitor`] watches named groups of bounded `tokio` channels and
//! logs their queue depth at a fixed interval. It runs as an async task,
//! either driven by the caller with [`ChannelMonitor::run`] or spawned with
//! [`ChannelMonitor::spawn`].
//!
//! # Example
//!
//! ```no_run
//! use logroll_metrics::ChannelMonitor;
//! use std::time::Duration;
//! use tokio::sync::mpsc;
//!
//! # async fn example() {
//! let (tx, _rx) = mpsc::channel::<String>(1024);
//!
//! let handle = ChannelMonitor::builder()
//!     .channel("parse", &tx)
//!     .interval(Duration::from_secs(30))
//!     .build()
//!     .spawn();
//!
//! // ... later
//! handle.stop();
//! let _ = handle.join().await;
//! # }
//! ```

mod monitor;

pub use monitor::{ChannelDepth, ChannelMonitor, ChannelMonitorBuilder, MonitorHandle};
