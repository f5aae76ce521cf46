// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile, RunnerSection};
use crate::errors::{DevboardError, Result};
use crate::exec::command::placeholders;
use crate::status::StatusMatcher;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DevboardError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

/// Run every semantic check against a parsed workspace file.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_raw_config(cfg)
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_projects(cfg)?;
    ensure_has_selection(cfg)?;
    validate_sections(cfg)?;
    validate_runner(&cfg.runner)?;
    validate_project_dependencies(cfg)?;
    validate_project_graph(cfg)?;
    validate_status_matchers(cfg)?;
    Ok(())
}

fn ensure_has_projects(cfg: &RawConfigFile) -> Result<()> {
    if cfg.project.is_empty() {
        return Err(DevboardError::ConfigError(
            "workspace must contain at least one [project.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn ensure_has_selection(cfg: &RawConfigFile) -> Result<()> {
    if !cfg.select.iter().any(|(_, sel)| sel.is_enabled()) {
        return Err(DevboardError::ConfigError(
            "[select] must enable at least one task".to_string(),
        ));
    }
    Ok(())
}

fn validate_sections(cfg: &RawConfigFile) -> Result<()> {
    if cfg.dashboard.tick_ms == 0 {
        return Err(DevboardError::ConfigError(
            "[dashboard].tick_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    let width = cfg.dashboard.list_width_percent;
    if !(10..=90).contains(&width) {
        return Err(DevboardError::ConfigError(format!(
            "[dashboard].list_width_percent must be between 10 and 90 (got {width})"
        )));
    }

    if cfg.supervisor.event_buffer == 0 {
        return Err(DevboardError::ConfigError(
            "[supervisor].event_buffer must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_runner(runner: &RunnerSection) -> Result<()> {
    if runner.program.trim().is_empty() {
        return Err(DevboardError::ConfigError(
            "[runner].program must not be empty".to_string(),
        ));
    }

    check_placeholders("run_args", &runner.run_args, &["target", "project", "task"])?;
    check_placeholders(
        "batch_args",
        &runner.batch_args,
        &["task", "projects"],
    )?;
    Ok(())
}

fn check_placeholders(field: &str, args: &[String], allowed: &[&str]) -> Result<()> {
    for arg in args {
        for name in placeholders(arg) {
            if !allowed.contains(&name) {
                return Err(DevboardError::ConfigError(format!(
                    "[runner].{field} uses unknown placeholder '{{{name}}}' in '{arg}' (allowed: {})",
                    allowed
                        .iter()
                        .map(|a| format!("{{{a}}}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
        }
    }
    Ok(())
}

fn validate_project_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (id, project) in cfg.project.iter() {
        for dep in project.depends_on.iter() {
            if !cfg.project.contains_key(dep) {
                return Err(DevboardError::ConfigError(format!(
                    "project '{}' has unknown dependency '{}' in `depends_on`",
                    id, dep
                )));
            }
            if dep == id {
                return Err(DevboardError::ConfigError(format!(
                    "project '{}' cannot depend on itself in `depends_on`",
                    id
                )));
            }
        }
    }
    Ok(())
}

fn validate_project_graph(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: dependency -> dependent. For
    //   [project.app]
    //   depends_on = ["lib"]
    // we add edge lib -> app.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for id in cfg.project.keys() {
        graph.add_node(id.as_str());
    }

    for (id, project) in cfg.project.iter() {
        for dep in project.depends_on.iter() {
            graph.add_edge(dep.as_str(), id.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(DevboardError::ConfigError(format!(
                "cycle detected in project dependencies involving project '{}'",
                node
            )))
        }
    }
}

fn validate_status_matchers(cfg: &RawConfigFile) -> Result<()> {
    for (_, selection) in cfg.select.iter() {
        for (pattern, status) in selection.status_matchers() {
            StatusMatcher::new(pattern, *status)?;
        }
    }
    Ok(())
}
