//! Logging setup for the symdex binary
//!
//! Logs go to stderr so that stdout stays clean for the index output, or to
//! a file when `--log-file` is given. `RUST_LOG` is honoured unless
//! `--verbose` forces the debug level.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter(verbose))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter(verbose))
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }
    Ok(())
}
