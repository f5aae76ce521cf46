// src/dag/resolver.rs

//! Prerequisite resolution for the selected watch tasks.

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::model::DependencyDecl;
use crate::dag::TaskGraphProvider;
use crate::errors::{DevboardError, Result};
use crate::types::TaskRef;

/// Prefix marking a prerequisite that also applies to the project's direct
/// dependency projects.
pub const UPSTREAM_MARKER: char = '^';

/// Compute the one-shot tasks that must complete before `requested` start.
///
/// For every `depends_on` entry of every requested task:
/// - `"name"` adds `project:name` if the project declares it;
/// - `"^name"` adds `project:name` if declared, plus `dep:name` for every
///   *direct* dependency project `dep` declaring it. Deeper upstream
///   projects are not visited.
///
/// Missing tasks are skipped silently. Any non-string declaration aborts
/// the resolution with [`DevboardError::UnsupportedDependencyKind`].
pub fn resolve_prerequisites<G>(requested: &[TaskRef], graph: &G) -> Result<BTreeSet<TaskRef>>
where
    G: TaskGraphProvider + ?Sized,
{
    let mut prerequisites = BTreeSet::new();

    for task in requested {
        let decls = graph
            .dependencies_of(task)
            .ok_or_else(|| DevboardError::TaskNotFound(task.to_string()))?;

        for decl in decls {
            let name = match decl {
                DependencyDecl::Named(name) => name.as_str(),
                DependencyDecl::Structured(_) | DependencyDecl::Other(_) => {
                    return Err(DevboardError::UnsupportedDependencyKind {
                        task: task.to_string(),
                        declaration: decl.to_string(),
                    });
                }
            };

            let (upstream, name) = match name.strip_prefix(UPSTREAM_MARKER) {
                Some(rest) => (true, rest),
                None => (false, name),
            };

            add_if_exists(&mut prerequisites, graph, &task.project, name);

            if upstream {
                for dep in graph.project_dependencies(&task.project) {
                    add_if_exists(&mut prerequisites, graph, dep, name);
                }
            }
        }
    }

    debug!(
        requested = requested.len(),
        resolved = prerequisites.len(),
        "resolved prerequisites"
    );

    Ok(prerequisites)
}

fn add_if_exists<G>(set: &mut BTreeSet<TaskRef>, graph: &G, project: &str, task: &str)
where
    G: TaskGraphProvider + ?Sized,
{
    if graph.has_task(project, task) {
        set.insert(TaskRef::new(project, task));
    }
}
