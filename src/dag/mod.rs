// src/dag/mod.rs

//! Workspace task graph.
//!
//! - [`graph`] holds the project/task graph built from the workspace file.
//! - [`resolver`] computes the prerequisite tasks of the selected watch
//!   tasks.
//! - [`selection`] matches the `[select]` table against the graph.

pub mod graph;
pub mod resolver;
pub mod selection;

pub use crate::config::model::DependencyDecl;
pub use graph::WorkspaceGraph;
pub use resolver::resolve_prerequisites;
pub use selection::{WatchTaskSpec, select_watch_tasks};

use crate::types::TaskRef;

/// Read-only view of a workspace's tasks, as needed by resolution and
/// selection.
///
/// [`WorkspaceGraph`] is the implementation built from `Devboard.toml`;
/// tests and embedders can provide their own.
pub trait TaskGraphProvider {
    /// Does `project` declare `task`?
    fn has_task(&self, project: &str, task: &str) -> bool;

    /// Declared `depends_on` entries of a task, in order; `None` if the task
    /// does not exist.
    fn dependencies_of(&self, task: &TaskRef) -> Option<&[DependencyDecl]>;

    /// Direct dependency projects of `project`.
    fn project_dependencies(&self, project: &str) -> &[String];

    /// Every declared task, in a stable order.
    fn tasks(&self) -> Vec<TaskRef>;
}
