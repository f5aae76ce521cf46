// src/dag/selection.rs

//! Picking watch tasks out of the graph from the `[select]` table.

use tracing::debug;

use crate::config::model::{OrderedTable, Selection};
use crate::dag::TaskGraphProvider;
use crate::errors::{DevboardError, Result};
use crate::status::StatusMatcher;
use crate::types::TaskRef;

/// A selected watch task, ready to become a dashboard row.
#[derive(Debug, Clone)]
pub struct WatchTaskSpec {
    pub task_ref: TaskRef,
    pub display_name: String,
    pub matchers: Vec<StatusMatcher>,
}

/// Match every task of the graph against the `[select]` entries.
///
/// An entry applies to a task when its key equals the task name or the full
/// `project:task` string; there is no glob or project-scoped matching. A
/// task is selected when at least one applying entry is enabled, and it
/// collects the status matchers of all applying entries in declaration
/// order. Tasks come out in graph order (project id, then task name).
pub fn select_watch_tasks<G>(select: &OrderedTable<Selection>, graph: &G) -> Result<Vec<WatchTaskSpec>>
where
    G: TaskGraphProvider + ?Sized,
{
    let mut selected = Vec::new();

    for task_ref in graph.tasks() {
        let qualified = task_ref.to_string();
        let mut include = false;
        let mut matchers = Vec::new();

        for (pattern, selection) in select.iter() {
            if pattern != task_ref.task && pattern != qualified {
                continue;
            }
            include |= selection.is_enabled();
            for (re, status) in selection.status_matchers() {
                matchers.push(StatusMatcher::new(re, *status)?);
            }
        }

        if include {
            debug!(task = %qualified, matchers = matchers.len(), "selected watch task");
            selected.push(WatchTaskSpec {
                task_ref,
                display_name: qualified,
                matchers,
            });
        }
    }

    if selected.is_empty() {
        let patterns = select
            .iter()
            .filter(|(_, s)| s.is_enabled())
            .map(|(p, _)| p)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(DevboardError::ConfigError(format!(
            "[select] did not match any task (patterns: {patterns})"
        )));
    }

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::SelectionOptions;
    use crate::dag::WorkspaceGraph;
    use crate::types::StatusValue;

    fn graph() -> WorkspaceGraph {
        WorkspaceGraph::new()
            .with_task("app", "serve", [])
            .with_task("app", "build", [])
            .with_task("admin", "serve", [])
            .with_task("lib", "watch", [])
    }

    fn options(matchers: &[(&str, StatusValue)]) -> Selection {
        Selection::Options(SelectionOptions {
            status_matchers: OrderedTable(
                matchers.iter().map(|(p, s)| (p.to_string(), *s)).collect(),
            ),
        })
    }

    fn names(specs: &[WatchTaskSpec]) -> Vec<&str> {
        specs.iter().map(|s| s.display_name.as_str()).collect()
    }

    #[test]
    fn plain_name_selects_task_on_every_project() {
        let select = OrderedTable(vec![("serve".to_string(), Selection::Enabled(true))]);
        let specs = select_watch_tasks(&select, &graph()).unwrap();
        assert_eq!(names(&specs), vec!["admin:serve", "app:serve"]);
        assert!(specs.iter().all(|s| s.matchers.is_empty()));
    }

    #[test]
    fn qualified_name_selects_one_task() {
        let select = OrderedTable(vec![(
            "lib:watch".to_string(),
            options(&[("compiled successfully", StatusValue::Success)]),
        )]);
        let specs = select_watch_tasks(&select, &graph()).unwrap();
        assert_eq!(names(&specs), vec!["lib:watch"]);
        assert_eq!(specs[0].matchers.len(), 1);
        assert_eq!(specs[0].matchers[0].status, StatusValue::Success);
    }

    #[test]
    fn matchers_from_all_applying_entries_are_merged_in_order() {
        let select = OrderedTable(vec![
            ("serve".to_string(), options(&[("ready", StatusValue::Success)])),
            ("lib:watch".to_string(), options(&[("never", StatusValue::Error)])),
            ("app:serve".to_string(), options(&[("ERR", StatusValue::Error)])),
        ]);
        let specs = select_watch_tasks(&select, &graph()).unwrap();
        let app = specs.iter().find(|s| s.display_name == "app:serve").unwrap();
        let statuses: Vec<_> = app.matchers.iter().map(|m| m.status).collect();
        assert_eq!(statuses, vec![StatusValue::Success, StatusValue::Error]);

        let admin = specs.iter().find(|s| s.display_name == "admin:serve").unwrap();
        assert_eq!(admin.matchers.len(), 1);
    }

    #[test]
    fn disabled_entries_do_not_select() {
        let select = OrderedTable(vec![
            ("serve".to_string(), Selection::Enabled(false)),
            ("lib:watch".to_string(), Selection::Enabled(true)),
        ]);
        let specs = select_watch_tasks(&select, &graph()).unwrap();
        assert_eq!(names(&specs), vec!["lib:watch"]);
    }

    #[test]
    fn empty_selection_is_an_error() {
        let select = OrderedTable(vec![("deploy".to_string(), Selection::Enabled(true))]);
        let err = select_watch_tasks(&select, &graph()).unwrap_err();
        assert!(matches!(err, DevboardError::ConfigError(ref m) if m.contains("deploy")));
    }
}
