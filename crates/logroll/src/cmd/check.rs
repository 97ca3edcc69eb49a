//! Check command - Validate a config and show where loggers write
//!
//! # Usage
//!
//! ```bash
//! logroll check --config configs/logroll.toml
//! ```
//!
//! Output has one line per logger:
//!
//! ```text
//! default  file    hourly  logs/app_2025-01-15_10.log
//! console  stderr  -       -
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::Args;
use logroll_config::{Config, LogOutput};
use logroll_logging::rotation_policy;
use logroll_sinks::{compute_path, split_extension};

/// Check command arguments
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "configs/logroll.toml")]
    pub config: PathBuf,
}

/// Run the check command
pub fn run(args: CheckArgs) -> Result<()> {
    let config = Config::from_file(&args.config)
        .with_context(|| format!("invalid config {}", args.config.display()))?;

    for line in render(&config, Local::now().naive_local()) {
        println!("{line}");
    }
    Ok(())
}

/// One aligned line per logger, resolved at `now`
fn render(config: &Config, now: NaiveDateTime) -> Vec<String> {
    let rows: Vec<[String; 4]> = config
        .all_loggers()
        .map(|(name, log)| {
            let output = output_name(log.output).to_string();
            match log.file_output() {
                Some(file) => {
                    let policy = rotation_policy(file);
                    let (prefix, extension) = split_extension(&policy.base_path);
                    let path = compute_path(now, policy.granularity, &prefix, &extension);
                    [
                        name.to_string(),
                        output,
                        policy.granularity.as_str().to_string(),
                        path.display().to_string(),
                    ]
                }
                None => [name.to_string(), output, "-".into(), "-".into()],
            }
        })
        .collect();

    let width = |col: usize| rows.iter().map(|r| r[col].len()).max().unwrap_or(0);
    let (w0, w1, w2) = (width(0), width(1), width(2));

    rows.iter()
        .map(|[name, output, rotation, path]| {
            format!("{name:<w0$}  {output:<w1$}  {rotation:<w2$}  {path}")
        })
        .collect()
}

fn output_name(output: LogOutput) -> &'static str {
    match output {
        LogOutput::Stdout => "stdout",
        LogOutput::Stderr => "stderr",
        LogOutput::File => "file",
        LogOutput::Both => "both",
    }
}
