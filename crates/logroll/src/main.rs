//! logroll - Pipe stdin into a rotating log file
//!
//! # Usage
//!
//! ```bash
//! # Copy stdin into the default logger's file
//! my-service | logroll pipe --config configs/logroll.toml
//!
//! # Use a named logger; `kill -HUP` rotates on demand
//! my-service | logroll pipe --config configs/logroll.toml --logger audit
//!
//! # Validate a config and show where each logger writes right now
//! logroll check --config configs/logroll.toml
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// logroll - Pipe stdin into a rotating log file
#[derive(Parser, Debug)]
#[command(name = "logroll")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level for logroll's own diagnostics (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy stdin into a logger's rotating file
    Pipe(cmd::pipe::PipeArgs),

    /// Validate a config and print each logger's active file
    Check(cmd::check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Command::Pipe(args) => match cmd::pipe::run(args).await? {
            cmd::pipe::PipeExit::Eof => Ok(()),
            // stdin may still be blocked in a read, don't wait for it
            cmd::pipe::PipeExit::Interrupted => std::process::exit(130),
        },
        Command::Check(args) => cmd::check::run(args),
    }
}

/// Diagnostics go to stderr; stdout stays free for command output
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .with(filter)
        .init();

    Ok(())
}
