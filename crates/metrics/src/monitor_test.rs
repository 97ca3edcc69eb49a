//! Tests for the channel depth monitor

use super::*;
use logroll_config::{FileConfig, LogConfig, LogOutput, RotationInterval, TimestampFormat};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::sync::mpsc;

fn file_logger(dir: &Path) -> (Arc<Logger>, PathBuf) {
    let path = dir.join("monitor.log");
    let config = LogConfig {
        output: LogOutput::File,
        timestamp: TimestampFormat::None,
        file: Some(FileConfig {
            path: path.to_string_lossy().into_owned(),
            rotation: RotationInterval::None,
            ..Default::default()
        }),
        ..Default::default()
    };
    (Arc::new(Logger::new("monitor", &config).unwrap()), path)
}

#[tokio::test]
async fn test_snapshot_reports_depth_and_capacity() {
    let (tx, _rx) = mpsc::channel::<u32>(10);
    tx.send(1).await.unwrap();
    tx.send(2).await.unwrap();
    tx.send(3).await.unwrap();

    let monitor = ChannelMonitor::builder().channel("work", &tx).build();
    assert_eq!(
        monitor.snapshot(),
        vec![ChannelDepth {
            name: "workch0".into(),
            depth: 3,
            capacity: 10,
        }]
    );
}

#[tokio::test]
async fn test_channel_appends_and_channels_replaces() {
    let (a, _ra) = mpsc::channel::<u32>(4);
    let (b, _rb) = mpsc::channel::<u32>(4);
    let (c, _rc) = mpsc::channel::<u32>(4);

    let monitor = ChannelMonitor::builder()
        .channel("parse", &a)
        .channel("parse", &b)
        .channels("write", &[a.clone()])
        .channels("write", &[b.clone(), c.clone()])
        .build();

    let names: Vec<_> = monitor.snapshot().into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["parsech0", "parsech1", "writech0", "writech1"]);
}

#[tokio::test]
async fn test_dropped_channels_leave_the_report() {
    let (a, _ra) = mpsc::channel::<u32>(4);
    let (b, _rb) = mpsc::channel::<u32>(4);

    let monitor = ChannelMonitor::builder()
        .channel("io", &a)
        .channel("io", &b)
        .build();
    drop(a);

    let names: Vec<_> = monitor.snapshot().into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["ioch1"]);
}

#[tokio::test]
async fn test_monitor_does_not_keep_channels_open() {
    let (tx, mut rx) = mpsc::channel::<u32>(4);
    let _monitor = ChannelMonitor::builder().channel("io", &tx).build();

    drop(tx);
    assert_eq!(rx.recv().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_reports_after_each_interval() {
    let dir = TempDir::new().unwrap();
    let (logger, path) = file_logger(dir.path());

    let (tx, _rx) = mpsc::channel::<u32>(8);
    tx.send(1).await.unwrap();
    tx.send(2).await.unwrap();

    let handle = ChannelMonitor::builder()
        .channel("work", &tx)
        .interval(Duration::from_secs(10))
        .logger(Arc::clone(&logger))
        .build()
        .spawn();

    tokio::time::sleep(Duration::from_secs(25)).await;
    handle.stop();
    handle.join().await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let reports: Vec<_> = contents
        .lines()
        .filter(|l| l.contains("channel depth"))
        .collect();
    assert_eq!(reports.len(), 2);
    assert!(reports[0].contains("WARN"));
    assert!(reports[0].contains("workch0=2"));
}

#[tokio::test(start_paused = true)]
async fn test_no_report_before_first_interval() {
    let dir = TempDir::new().unwrap();
    let (logger, path) = file_logger(dir.path());
    let (tx, _rx) = mpsc::channel::<u32>(8);

    let handle = ChannelMonitor::builder()
        .channel("work", &tx)
        .logger(logger)
        .build()
        .spawn();

    tokio::time::sleep(Duration::from_secs(30)).await;
    handle.stop();
    handle.join().await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("channel depth"));
}

#[tokio::test(start_paused = true)]
async fn test_empty_monitor_stays_quiet() {
    let dir = TempDir::new().unwrap();
    let (logger, path) = file_logger(dir.path());
    let (tx, _rx) = mpsc::channel::<u32>(8);

    let handle = ChannelMonitor::builder()
        .channel("gone", &tx)
        .interval(Duration::from_secs(1))
        .logger(logger)
        .build()
        .spawn();
    drop(tx);

    tokio::time::sleep(Duration::from_secs(5)).await;
    handle.stop();
    handle.join().await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("channel depth"));
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_uses_default() {
    let dir = TempDir::new().unwrap();
    let (logger, path) = file_logger(dir.path());
    let (tx, _rx) = mpsc::channel::<u32>(8);
    tx.send(7).await.unwrap();

    let monitor = ChannelMonitor::builder()
        .channel("p", &tx)
        .interval(Duration::ZERO)
        .logger(logger)
        .build();
    assert_eq!(monitor.interval(), Duration::from_secs(60));

    let handle = monitor.spawn();
    tokio::time::sleep(Duration::from_secs(61)).await;
    handle.stop();
    handle.join().await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let reports = contents.lines().filter(|l| l.contains("pch0=1")).count();
    assert_eq!(reports, 1);
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_from_config_uses_default() {
    let (tx, _rx) = mpsc::channel::<u32>(8);
    let monitor = ChannelMonitor::builder()
        .config(MonitorConfig {
            interval: Duration::ZERO,
            ..Default::default()
        })
        .channel("p", &tx)
        .build();
    assert_eq!(monitor.interval(), Duration::from_secs(60));

    let handle = monitor.spawn();
    handle.stop();
    handle.join().await.unwrap();
}

#[tokio::test]
async fn test_disabled_monitor_exits_immediately() {
    let handle = ChannelMonitor::<u32>::builder()
        .config(MonitorConfig {
            enabled: false,
            ..Default::default()
        })
        .build()
        .spawn();

    // finishes without stop()
    handle.join().await.unwrap();
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let handle = ChannelMonitor::<u32>::builder().build().spawn();
    assert!(!handle.is_stopped());

    handle.stop();
    handle.stop();
    assert!(handle.is_stopped());
    handle.join().await.unwrap();
}

#[test]
fn test_default_interval() {
    let monitor = ChannelMonitor::<u32>::builder().build();
    assert_eq!(monitor.interval(), Duration::from_secs(60));
}

#[test]
fn test_depths_display() {
    let depths = [
        ChannelDepth {
            name: "ach0".into(),
            depth: 1,
            capacity: 4,
        },
        ChannelDepth {
            name: "bch0".into(),
            depth: 0,
            capacity: 4,
        },
    ];
    assert_eq!(Depths(&depths).to_string(), "ach0=1 bch0=0");
    assert_eq!(Depths(&[]).to_string(), "");
}
