// src/dag/graph.rs

use std::collections::BTreeMap;

use crate::config::model::{ConfigFile, DependencyDecl};
use crate::dag::TaskGraphProvider;
use crate::types::TaskRef;

/// Internal node structure: one project with its direct dependencies and
/// declared tasks.
#[derive(Debug, Clone, Default)]
struct ProjectNode {
    /// Direct project dependencies, as declared.
    deps: Vec<String>,
    /// Declared tasks and their `depends_on` lists.
    tasks: BTreeMap<String, Vec<DependencyDecl>>,
}

/// In-memory project/task graph keyed by project id.
///
/// This is intentionally lightweight; project dependencies are validated
/// (known ids, no cycles) in `config::validate`, so here we only keep
/// adjacency information for prerequisite resolution and selection.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceGraph {
    projects: BTreeMap<String, ProjectNode>,
}

impl WorkspaceGraph {
    /// Build the graph from a validated [`ConfigFile`].
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let projects = cfg
            .project
            .iter()
            .map(|(id, project)| {
                let tasks = project
                    .task
                    .iter()
                    .map(|(name, task)| (name.clone(), task.depends_on.clone()))
                    .collect();
                (
                    id.clone(),
                    ProjectNode {
                        deps: project.depends_on.clone(),
                        tasks,
                    },
                )
            })
            .collect();

        Self { projects }
    }

    /// Start an empty graph; used with [`WorkspaceGraph::with_task`] and
    /// [`WorkspaceGraph::with_project_dependency`] to build graphs in code.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(
        mut self,
        project: &str,
        task: &str,
        depends_on: impl IntoIterator<Item = DependencyDecl>,
    ) -> Self {
        self.projects
            .entry(project.to_string())
            .or_default()
            .tasks
            .insert(task.to_string(), depends_on.into_iter().collect());
        self
    }

    pub fn with_project_dependency(mut self, project: &str, dependency: &str) -> Self {
        self.projects
            .entry(project.to_string())
            .or_default()
            .deps
            .push(dependency.to_string());
        self
    }

    /// All project ids, sorted.
    pub fn projects(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(|s| s.as_str())
    }
}

impl TaskGraphProvider for WorkspaceGraph {
    fn has_task(&self, project: &str, task: &str) -> bool {
        self.projects
            .get(project)
            .is_some_and(|p| p.tasks.contains_key(task))
    }

    fn dependencies_of(&self, task: &TaskRef) -> Option<&[DependencyDecl]> {
        self.projects
            .get(&task.project)?
            .tasks
            .get(&task.task)
            .map(|decls| decls.as_slice())
    }

    fn project_dependencies(&self, project: &str) -> &[String] {
        self.projects
            .get(project)
            .map(|p| p.deps.as_slice())
            .unwrap_or(&[])
    }

    fn tasks(&self) -> Vec<TaskRef> {
        self.projects
            .iter()
            .flat_map(|(id, p)| p.tasks.keys().map(move |t| TaskRef::new(id.as_str(), t.as_str())))
            .collect()
    }
}
