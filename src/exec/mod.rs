// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] expands the `[runner]` templates into [`CommandSpec`]s.
//! - [`backend`] provides the `ProcessLauncher` trait and the production
//!   `TokioLauncher`; tests can swap in their own launcher.
//! - [`supervisor`] runs the long-lived watch processes and turns their
//!   output and exit into [`TaskEvent`]s.
//! - [`batch`] runs the one-shot prerequisite batches before the dashboard
//!   starts.

pub mod backend;
pub mod batch;
pub mod command;
pub mod supervisor;

pub use backend::{OutputMode, ProcessLauncher, TokioLauncher};
pub use batch::{group_prerequisites, run_prerequisite_batches};
pub use command::{CommandSpec, RunnerTemplate};
pub use supervisor::{ExitKind, ProcessEvent, ProcessHandle, Supervisor, TaskEvent};
