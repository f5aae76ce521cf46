// src/logging.rs

//! Logging setup for `devboard` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `DEVBOARD_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Without `--log-file`, logs go to STDERR, except while the dashboard owns
//! the terminal: anything written then would land in the middle of the
//! alternate screen, so the stderr writer is gated off for the session.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

static STDERR_MUTED: AtomicBool = AtomicBool::new(false);

/// Stop (or resume) writing log lines to stderr.
///
/// Called by the terminal guard when it takes and releases the terminal.
pub fn mute_stderr(muted: bool) {
    STDERR_MUTED.store(muted, Ordering::SeqCst);
}

fn gated_stderr() -> Box<dyn io::Write> {
    if STDERR_MUTED.load(Ordering::SeqCst) {
        Box::new(io::sink())
    } else {
        Box::new(io::stderr())
    }
}

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>, log_file: Option<&str>) -> Result<()> {
    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => std::env::var("DEVBOARD_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    let builder = fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file '{path}'"))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            builder.with_writer(gated_stderr).init();
        }
    }

    Ok(())
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
