// src/engine/mod.rs

//! Dashboard session engine.
//!
//! This module ties together:
//! - the per-task state (log buffers, status, process handles)
//! - the dashboard view model
//! - the session loop that reacts to:
//!   - output and exits of the watch processes
//!   - terminal input
//!   - the spinner tick
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::exec::TaskEvent;
use crate::tui::UiEvent;
use crate::types::{Signal, TaskId};

/// Events flowing into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Output or exit of a watch process.
    Process(TaskEvent),
    /// Spinner tick.
    Tick,
    /// User input.
    Input(UiEvent),
}

/// Side effects the core asks the IO shell to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Signal { tasks: Vec<TaskId>, signal: Signal },
    /// Leave now, without waiting for live processes.
    ForceExit,
}

/// How a dashboard session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every watch task has exited.
    AllExited,
    /// The user pressed Ctrl-C twice in quick succession.
    ForcedExit,
}

/// Result of feeding one event to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStep {
    pub commands: Vec<SessionCommand>,
    pub keep_running: bool,
    /// The visible state changed.
    pub redraw: bool,
}

impl SessionStep {
    pub fn idle() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
            redraw: false,
        }
    }

    pub fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::idle()
        }
    }

    pub fn stop(commands: Vec<SessionCommand>) -> Self {
        Self {
            commands,
            keep_running: false,
            redraw: false,
        }
    }
}

pub mod core;
pub mod runtime;
pub mod state;

pub use core::SessionCore;
pub use runtime::Session;
pub use state::{TaskArena, TaskState};
