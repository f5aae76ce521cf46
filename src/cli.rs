// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `devboard`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devboard",
    version,
    about = "Run a workspace's watch tasks side by side in a terminal dashboard.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the workspace file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Devboard.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEVBOARD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Write diagnostics to this file instead of stderr.
    ///
    /// Stderr output is suppressed while the dashboard owns the terminal,
    /// so this is the only way to see logs from inside a session.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<String>,

    /// Resolve the selection and prerequisites, print the plan, run nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_devboard_toml() {
        let args = CliArgs::parse_from(["devboard"]);
        assert_eq!(args.config, "Devboard.toml");
        assert!(!args.dry_run);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn parses_all_flags() {
        let args = CliArgs::parse_from([
            "devboard",
            "--config",
            "ws/Devboard.toml",
            "--log-level",
            "debug",
            "--log-file",
            "devboard.log",
            "--dry-run",
        ]);
        assert_eq!(args.config, "ws/Devboard.toml");
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert_eq!(args.log_file.as_deref(), Some("devboard.log"));
        assert!(args.dry_run);
    }
}
