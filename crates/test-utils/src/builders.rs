#![allow(dead_code)]

use std::collections::BTreeMap;

use devboard::config::{
    ConfigFile, DashboardSection, DependencyDecl, OrderedTable, ProjectConfig, RawConfigFile,
    RunnerSection, Selection, SelectionOptions, SupervisorSection, TaskConfig,
};
use devboard::errors::Result;
use devboard::types::StatusValue;

/// Builder for `ConfigFile` to simplify test setup.
pub struct WorkspaceBuilder {
    config: RawConfigFile,
}

impl WorkspaceBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                runner: RunnerSection::default(),
                dashboard: DashboardSection::default(),
                supervisor: SupervisorSection::default(),
                project: BTreeMap::new(),
                select: OrderedTable::default(),
            },
        }
    }

    pub fn with_project(mut self, id: &str, project: ProjectConfig) -> Self {
        self.config.project.insert(id.to_string(), project);
        self
    }

    /// `[select] <key> = true`
    pub fn select(mut self, key: &str) -> Self {
        self.config
            .select
            .0
            .push((key.to_string(), Selection::Enabled(true)));
        self
    }

    /// `[select] <key> = false`
    pub fn deselect(mut self, key: &str) -> Self {
        self.config
            .select
            .0
            .push((key.to_string(), Selection::Enabled(false)));
        self
    }

    /// `[select] <key> = { status_matchers = { ... } }`, in the given order.
    pub fn select_with_matchers(mut self, key: &str, matchers: &[(&str, StatusValue)]) -> Self {
        let status_matchers = OrderedTable(
            matchers
                .iter()
                .map(|(re, status)| (re.to_string(), *status))
                .collect(),
        );
        self.config.select.0.push((
            key.to_string(),
            Selection::Options(SelectionOptions { status_matchers }),
        ));
        self
    }

    pub fn with_runner(mut self, runner: RunnerSection) -> Self {
        self.config.runner = runner;
        self
    }

    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.config.dashboard.tick_ms = tick_ms;
        self
    }

    pub fn with_drain_ms(mut self, drain_ms: u64) -> Self {
        self.config.supervisor.drain_ms = drain_ms;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for WorkspaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ProjectConfig`.
pub struct ProjectBuilder {
    project: ProjectConfig,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            project: ProjectConfig::default(),
        }
    }

    pub fn depends_on(mut self, project: &str) -> Self {
        self.project.depends_on.push(project.to_string());
        self
    }

    /// Task with plain `depends_on` strings (`"build"`, `"^build"`).
    pub fn task(self, name: &str, depends_on: &[&str]) -> Self {
        let decls = depends_on.iter().map(|d| DependencyDecl::named(*d)).collect();
        self.task_with(name, decls)
    }

    pub fn task_with(mut self, name: &str, depends_on: Vec<DependencyDecl>) -> Self {
        self.project
            .task
            .insert(name.to_string(), TaskConfig { depends_on });
        self
    }

    pub fn build(self) -> ProjectConfig {
        self.project
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A structured `depends_on` entry, e.g. `{ target = "build" }`.
pub fn structured_dependency(key: &str, value: &str) -> DependencyDecl {
    let mut table = toml::Table::new();
    table.insert(key.to_string(), toml::Value::String(value.to_string()));
    DependencyDecl::Structured(table)
}
