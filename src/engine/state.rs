// src/engine/state.rs

//! Per-task session state.

use crate::dag::WatchTaskSpec;
use crate::exec::ProcessHandle;
use crate::status::{LogBuffer, StatusMatcher, compute_status};
use crate::types::{StatusValue, TaskId, TaskRef};

/// Everything the session knows about one watch task.
#[derive(Debug)]
pub struct TaskState {
    pub task_ref: TaskRef,
    pub display_name: String,
    pub matchers: Vec<StatusMatcher>,
    pub status: StatusValue,
    pub log: LogBuffer,
    /// Present while the process may still be running.
    pub process: Option<ProcessHandle>,
    exited: bool,
}

impl TaskState {
    pub fn new(spec: WatchTaskSpec) -> Self {
        Self {
            task_ref: spec.task_ref,
            display_name: spec.display_name,
            matchers: spec.matchers,
            status: StatusValue::Loading,
            log: LogBuffer::new(),
            process: None,
            exited: false,
        }
    }

    pub fn exited(&self) -> bool {
        self.exited
    }

    /// Append output and re-evaluate the status against the whole plain log.
    ///
    /// Returns the raw text that was added.
    pub fn record_output(&mut self, chunk: &[u8]) -> String {
        let added = self.log.append(chunk).to_owned();
        if let Some(status) = compute_status(self.log.plain(), &self.matchers) {
            self.status = status;
        }
        added
    }

    /// Mark the task as finished for good. Returns `false` if it already was.
    pub fn mark_exited(&mut self) -> bool {
        if self.exited {
            return false;
        }
        self.exited = true;
        self.status = StatusValue::Error;
        self.process = None;
        true
    }
}

/// All watch tasks of a session, indexed by [`TaskId`] in row order.
#[derive(Debug, Default)]
pub struct TaskArena {
    tasks: Vec<TaskState>,
}

impl TaskArena {
    pub fn new(specs: impl IntoIterator<Item = WatchTaskSpec>) -> Self {
        Self {
            tasks: specs.into_iter().map(TaskState::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskState> {
        self.tasks.get(id.0)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut TaskState> {
        self.tasks.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &TaskState)> {
        self.tasks.iter().enumerate().map(|(i, t)| (TaskId(i), t))
    }

    /// True once every task has exited (vacuously true when empty).
    pub fn all_exited(&self) -> bool {
        self.tasks.iter().all(TaskState::exited)
    }

    /// Tasks that have not exited yet.
    pub fn live(&self) -> Vec<TaskId> {
        self.iter()
            .filter(|(_, t)| !t.exited())
            .map(|(id, _)| id)
            .collect()
    }
}
