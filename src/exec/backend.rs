// src/exec/backend.rs

//! Pluggable process launcher abstraction.
//!
//! The supervisor and the prerequisite batches talk to a `ProcessLauncher`
//! instead of `tokio::process::Command` directly, so tests and embedders can
//! decide how a [`CommandSpec`] becomes a running child.

use std::io;
use std::process::Stdio;

use tokio::process::{Child, Command};

use super::command::CommandSpec;

/// Where a child's stdout/stderr go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Piped back to us (watch tasks).
    Capture,
    /// Written straight to our own stdout/stderr (prerequisite batches).
    Inherit,
}

/// Trait abstracting how external processes are started.
///
/// Implementations must return a child whose stdin is already closed and,
/// for [`OutputMode::Capture`], whose stdout and stderr are piped.
pub trait ProcessLauncher: Send + Sync {
    fn spawn(&self, spec: &CommandSpec, output: OutputMode) -> io::Result<Child>;
}

/// Production launcher backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
    fn spawn(&self, spec: &CommandSpec, output: OutputMode) -> io::Result<Child> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.cwd)
            .stdin(Stdio::piped())
            .kill_on_drop(true);

        match output {
            OutputMode::Capture => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            OutputMode::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
        }

        let mut child = cmd.spawn()?;
        // No interactive input is ever sent.
        drop(child.stdin.take());
        Ok(child)
    }
}
