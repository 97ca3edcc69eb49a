//! Tests for rotation policy and path construction

use super::*;
use chrono::NaiveDate;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

// ============================================================================
// TimeGranularity Tests
// ============================================================================

#[test]
fn test_time_tokens() {
    let now = at(2024, 3, 1, 9, 5, 7);

    assert_eq!(TimeGranularity::None.time_token(now), None);
    assert_eq!(
        TimeGranularity::Daily.time_token(now).as_deref(),
        Some("2024-03-01")
    );
    assert_eq!(
        TimeGranularity::Hourly.time_token(now).as_deref(),
        Some("2024-03-01_09")
    );
    assert_eq!(
        TimeGranularity::Minutely.time_token(now).as_deref(),
        Some("2024-03-01_09_05")
    );
}

#[test]
fn test_next_boundary_daily_is_next_midnight() {
    let now = at(2024, 2, 28, 23, 59, 59);
    assert_eq!(
        TimeGranularity::Daily.next_boundary(now),
        Some(at(2024, 2, 29, 0, 0, 0))
    );
}

#[test]
fn test_next_boundary_hourly_is_top_of_next_hour() {
    let now = at(2024, 1, 1, 10, 30, 0);
    assert_eq!(
        TimeGranularity::Hourly.next_boundary(now),
        Some(at(2024, 1, 1, 11, 0, 0))
    );

    // Crossing midnight
    let late = at(2024, 12, 31, 23, 15, 0);
    assert_eq!(
        TimeGranularity::Hourly.next_boundary(late),
        Some(at(2025, 1, 1, 0, 0, 0))
    );
}

#[test]
fn test_next_boundary_minutely() {
    let now = at(2024, 1, 1, 10, 59, 30);
    assert_eq!(
        TimeGranularity::Minutely.next_boundary(now),
        Some(at(2024, 1, 1, 11, 0, 0))
    );
}

#[test]
fn test_next_boundary_exactly_on_boundary_moves_forward() {
    let now = at(2024, 1, 1, 11, 0, 0);
    assert_eq!(
        TimeGranularity::Hourly.next_boundary(now),
        Some(at(2024, 1, 1, 12, 0, 0))
    );
}

#[test]
fn test_next_boundary_none() {
    assert_eq!(
        TimeGranularity::None.next_boundary(at(2024, 1, 1, 0, 0, 0)),
        None
    );
}

#[test]
fn test_default_granularity_is_daily() {
    assert_eq!(TimeGranularity::default(), TimeGranularity::Daily);
    assert_eq!(TimeGranularity::Daily.as_str(), "daily");
}

// ============================================================================
// Path Tests
// ============================================================================

#[test]
fn test_split_extension() {
    let (prefix, ext) = split_extension(Path::new("logs/app.log"));
    assert_eq!(prefix, PathBuf::from("logs/app"));
    assert_eq!(ext, OsString::from(".log"));
}

#[test]
fn test_split_extension_keeps_inner_dots() {
    let (prefix, ext) = split_extension(Path::new("/var/log/app.v2.json"));
    assert_eq!(prefix, PathBuf::from("/var/log/app.v2"));
    assert_eq!(ext, OsString::from(".json"));
}

#[test]
fn test_split_extension_without_extension() {
    let (prefix, ext) = split_extension(Path::new("logs/app"));
    assert_eq!(prefix, PathBuf::from("logs/app"));
    assert!(ext.is_empty());
}

#[test]
fn test_split_extension_dot_file() {
    let (prefix, ext) = split_extension(Path::new("logs/.hidden"));
    assert_eq!(ext, OsString::from(".hidden"));
    assert_eq!(
        compute_path(at(2024, 3, 1, 0, 0, 0), TimeGranularity::Daily, &prefix, &ext),
        PathBuf::from("logs/_2024-03-01.hidden")
    );
    assert_eq!(
        compute_path(at(2024, 3, 1, 0, 0, 0), TimeGranularity::None, &prefix, &ext),
        PathBuf::from("logs/.hidden")
    );

    let (prefix, ext) = split_extension(Path::new(".hidden"));
    assert_eq!(prefix, PathBuf::new());
    assert_eq!(ext, OsString::from(".hidden"));
}

#[test]
fn test_split_extension_trailing_dot() {
    let (prefix, ext) = split_extension(Path::new("logs/app."));
    assert_eq!(prefix, PathBuf::from("logs/app"));
    assert_eq!(ext, OsString::from("."));
}

#[test]
fn test_compute_path_formats() {
    let now = at(2024, 3, 1, 23, 59, 59);
    let prefix = Path::new("logs/app");
    let ext = OsStr::new(".log");

    assert_eq!(
        compute_path(now, TimeGranularity::Daily, prefix, ext),
        PathBuf::from("logs/app_2024-03-01.log")
    );
    assert_eq!(
        compute_path(now, TimeGranularity::Hourly, prefix, ext),
        PathBuf::from("logs/app_2024-03-01_23.log")
    );
    assert_eq!(
        compute_path(now, TimeGranularity::Minutely, prefix, ext),
        PathBuf::from("logs/app_2024-03-01_23_59.log")
    );
    assert_eq!(
        compute_path(now, TimeGranularity::None, prefix, ext),
        PathBuf::from("logs/app.log")
    );
}

#[test]
fn test_compute_path_is_deterministic() {
    let now = at(2024, 7, 14, 8, 0, 0);
    let prefix = Path::new("/srv/out/events");
    let ext = OsStr::new(".jsonl");

    let first = compute_path(now, TimeGranularity::Hourly, prefix, ext);
    let second = compute_path(now, TimeGranularity::Hourly, prefix, ext);
    assert_eq!(first, second);
}

#[test]
fn test_compute_path_round_trips_base_path_for_none() {
    let base = Path::new("logs/app.log");
    let (prefix, ext) = split_extension(base);
    let now = at(2024, 1, 1, 0, 0, 0);
    assert_eq!(compute_path(now, TimeGranularity::None, &prefix, &ext), base);
}

#[test]
fn test_numbered_path() {
    assert_eq!(
        numbered_path(Path::new("logs/app_2024-03-01"), 3, OsStr::new(".log")),
        PathBuf::from("logs/app_2024-03-01.3.log")
    );
    assert_eq!(
        numbered_path(Path::new("logs/app"), 1, OsStr::new("")),
        PathBuf::from("logs/app.1")
    );
}

// ============================================================================
// RotationPolicy Tests
// ============================================================================

#[test]
fn test_policy_defaults() {
    let policy = RotationPolicy::new("logs/app.log");
    assert_eq!(policy.base_path, PathBuf::from("logs/app.log"));
    assert_eq!(policy.granularity, TimeGranularity::Daily);
    assert_eq!(policy.max_size_bytes, 0);
    assert_eq!(policy.size_rollover, SizeRollover::Numbered);
    assert!(!policy.compress);
}

#[test]
fn test_policy_chained_builders() {
    let policy = RotationPolicy::new("/data/app.log")
        .with_granularity(TimeGranularity::Minutely)
        .with_max_size_bytes(1024)
        .with_size_rollover(SizeRollover::Reopen)
        .with_max_backups(5)
        .with_max_age_days(7)
        .with_compress(true);

    assert_eq!(policy.granularity, TimeGranularity::Minutely);
    assert_eq!(policy.max_size_bytes, 1024);
    assert_eq!(policy.size_rollover, SizeRollover::Reopen);
    assert_eq!(policy.max_backups, 5);
    assert_eq!(policy.max_age_days, 7);
    assert!(policy.compress);
}
