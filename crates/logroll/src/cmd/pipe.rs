//! Pipe command - Copy stdin into a rotating log file
//!
//! Lines are written to the sink exactly as read, so records keep whatever
//! encoding the producer used. A line is never split across files.
//!
//! # Signals
//!
//! - `SIGHUP`: rotate now
//! - `SIGINT` / `SIGTERM`: flush, close and exit

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Args;
use logroll_config::{Config, DEFAULT_LOGGER};
use logroll_logging::rotation_policy;
use logroll_sinks::RotatingWriter;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Pipe command arguments
#[derive(Args, Debug)]
pub struct PipeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "configs/logroll.toml")]
    pub config: PathBuf,

    /// Logger whose file receives stdin
    #[arg(long, default_value = DEFAULT_LOGGER)]
    pub logger: String,
}

/// How the copy loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeExit {
    /// stdin reached end of file
    Eof,
    /// A shutdown signal arrived first
    Interrupted,
}

/// Totals for one pipe run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipeStats {
    pub lines: u64,
    pub bytes: u64,
    pub rotations: u64,
}

/// Run the pipe command
pub async fn run(args: PipeArgs) -> Result<PipeExit> {
    let config = Config::from_file(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;

    let log = config
        .logger(&args.logger)
        .ok_or_else(|| anyhow!("logger '{}' is not configured", args.logger))?;
    let file = log
        .file_output()
        .ok_or_else(|| anyhow!("logger '{}' has no file output", args.logger))?;

    let writer = Arc::new(
        RotatingWriter::new(rotation_policy(file)).context("failed to open log file")?,
    );
    info!(
        logger = %args.logger,
        path = %writer.current_path_string(),
        "piping stdin"
    );

    let shutdown = CancellationToken::new();
    let (rotate_tx, mut rotate_rx) = mpsc::channel(1);
    spawn_signal_handlers(shutdown.clone(), rotate_tx);

    let stdin = BufReader::new(tokio::io::stdin());
    let result = pump(stdin, &writer, &mut rotate_rx, &shutdown).await;

    // close even when the copy failed, so buffered data reaches disk
    let closed = writer.flush().and_then(|()| writer.close());

    let (exit, stats) = result?;
    closed.context("failed to close log file")?;

    info!(
        lines = stats.lines,
        bytes = stats.bytes,
        rotations = stats.rotations,
        exit = ?exit,
        "pipe finished"
    );
    Ok(exit)
}

/// Copy lines from `reader` into `writer` until EOF or shutdown
///
/// Shutdown wins over pending rotations, which win over reading more input.
pub async fn pump<R>(
    mut reader: R,
    writer: &RotatingWriter,
    rotate: &mut mpsc::Receiver<()>,
    shutdown: &CancellationToken,
) -> Result<(PipeExit, PipeStats)>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = PipeStats::default();
    let mut line = Vec::with_capacity(4096);

    let exit = loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break PipeExit::Interrupted,

            Some(()) = rotate.recv() => {
                match writer.force_rotate() {
                    Ok(()) => {
                        stats.rotations += 1;
                        info!(path = %writer.current_path_string(), "rotated on request");
                    }
                    Err(e) => error!(error = %e, "requested rotation failed"),
                }
            }

            // read_until keeps partial input in `line` if another branch wins
            read = reader.read_until(b'\n', &mut line) => {
                let n = read.context("failed to read stdin")?;
                if n == 0 && line.is_empty() {
                    break PipeExit::Eof;
                }
                writer.write(&line).context("failed to write log file")?;
                stats.lines += 1;
                stats.bytes += line.len() as u64;
                line.clear();
            }
        }
    };

    debug!(lines = stats.lines, "copy loop stopped");
    Ok((exit, stats))
}

/// Forward SIGHUP as rotation requests and SIGINT/SIGTERM as shutdown
fn spawn_signal_handlers(shutdown: CancellationToken, rotate: mpsc::Sender<()>) {
    #[cfg(unix)]
    match signal::unix::signal(signal::unix::SignalKind::hangup()) {
        Ok(mut sig) => {
            tokio::spawn(async move {
                while sig.recv().await.is_some() {
                    // one pending request is enough
                    let _ = rotate.try_send(());
                }
            });
            debug!("SIGHUP handler installed for on-demand rotation");
        }
        Err(e) => warn!(error = %e, "failed to install SIGHUP handler"),
    }

    #[cfg(not(unix))]
    drop(rotate);

    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("shutdown signal received, closing log file...");
        shutdown.cancel();
    });
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
#[path = "pipe_test.rs"]
mod tests;
