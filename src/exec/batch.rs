// src/exec/batch.rs

//! One-shot prerequisite batches.
//!
//! Prerequisites are grouped by task name and every group runs as a single
//! runner invocation (`run-many -t build -p app,lib`), one group after the
//! other. Output goes straight to the terminal since no dashboard exists
//! yet.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{error, info};

use crate::errors::{DevboardError, Result};
use crate::exec::backend::{OutputMode, ProcessLauncher};
use crate::exec::command::RunnerTemplate;
use crate::types::TaskRef;

/// Group prerequisite tasks by task name: `build -> [app, lib]`.
///
/// Both the groups and the projects inside each group are sorted.
pub fn group_prerequisites(tasks: &BTreeSet<TaskRef>) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for task in tasks {
        groups
            .entry(task.task.clone())
            .or_default()
            .push(task.project.clone());
    }
    groups
}

/// Run every group to completion, in order.
///
/// Stops at the first group that fails to spawn or exits unsuccessfully;
/// later groups are not started.
pub async fn run_prerequisite_batches<L>(
    groups: &BTreeMap<String, Vec<String>>,
    runner: &RunnerTemplate,
    launcher: &L,
) -> Result<()>
where
    L: ProcessLauncher + ?Sized,
{
    for (task, projects) in groups {
        let spec = runner.batch_command(task, projects);
        info!(task = %task, ?projects, cmd = %spec, "running prerequisite batch");

        let mut child = launcher
            .spawn(&spec, OutputMode::Inherit)
            .map_err(|source| DevboardError::Spawn {
                command: spec.to_string(),
                source,
            })?;

        let status = child.wait().await?;
        if !status.success() {
            error!(task = %task, ?projects, code = ?status.code(), "prerequisite batch failed");
            return Err(DevboardError::PrerequisiteFailed {
                task: task.clone(),
                projects: projects.clone(),
                code: status.code(),
            });
        }

        info!(task = %task, "prerequisite batch finished");
    }

    Ok(())
}
