// src/config/model.rs

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};

use crate::types::StatusValue;

/// Top-level workspace file as read from TOML, before validation.
///
/// ```toml
/// [runner]
/// program = "nx"
///
/// [project.app]
/// depends_on = ["lib"]
///
/// [project.app.task.serve]
/// depends_on = ["^build"]
///
/// [select]
/// serve = true
/// ```
///
/// All sections are optional and have reasonable defaults; use
/// [`ConfigFile`] (via `TryFrom`) for the validated form.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub runner: RunnerSection,

    #[serde(default)]
    pub dashboard: DashboardSection,

    #[serde(default)]
    pub supervisor: SupervisorSection,

    /// All projects from `[project.<id>]`, keyed by project id.
    #[serde(default)]
    pub project: BTreeMap<String, ProjectConfig>,

    /// Task selection from `[select]`, in declaration order.
    #[serde(default)]
    pub select: OrderedTable<Selection>,
}

/// Validated workspace file.
///
/// Only obtainable through `ConfigFile::try_from(raw)` (see `validate.rs`),
/// so holders can rely on project dependencies being known and acyclic and
/// on every status matcher pattern compiling.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub runner: RunnerSection,
    pub dashboard: DashboardSection,
    pub supervisor: SupervisorSection,
    pub project: BTreeMap<String, ProjectConfig>,
    pub select: OrderedTable<Selection>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            runner: raw.runner,
            dashboard: raw.dashboard,
            supervisor: raw.supervisor,
            project: raw.project,
            select: raw.select,
        }
    }
}

/// `[runner]` section: how tasks are turned into command lines.
///
/// Argument templates may use `{target}` (`project:task`), `{project}` and
/// `{task}`; `batch_args` may also use `{projects}` (comma-joined).
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments for one long-running watch task.
    #[serde(default = "default_run_args")]
    pub run_args: Vec<String>,

    /// Arguments for one prerequisite batch (one task name, many projects).
    #[serde(default = "default_batch_args")]
    pub batch_args: Vec<String>,

    /// Working directory; relative paths resolve against the workspace file.
    #[serde(default)]
    pub cwd: Option<String>,
}

fn default_program() -> String {
    "nx".to_string()
}

fn default_run_args() -> Vec<String> {
    [
        "run",
        "{target}",
        "--output-style=stream-without-prefixes",
        "--excludeTaskDependencies",
        "--skipNxCache",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_batch_args() -> Vec<String> {
    [
        "run-many",
        "-t",
        "{task}",
        "-p",
        "{projects}",
        "--output-style=stream",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            run_args: default_run_args(),
            batch_args: default_batch_args(),
            cwd: None,
        }
    }
}

/// `[dashboard]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSection {
    /// Spinner animation / redraw interval.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// A second Ctrl-C within this window exits immediately.
    #[serde(default = "default_interrupt_window_ms")]
    pub interrupt_window_ms: u64,

    /// Width of the task list, in percent of the terminal.
    #[serde(default = "default_list_width_percent")]
    pub list_width_percent: u16,
}

fn default_tick_ms() -> u64 {
    80
}

fn default_interrupt_window_ms() -> u64 {
    2000
}

fn default_list_width_percent() -> u16 {
    30
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            interrupt_window_ms: default_interrupt_window_ms(),
            list_width_percent: default_list_width_percent(),
        }
    }
}

/// `[supervisor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorSection {
    /// Capacity of the process event channel. Readers wait when it is full;
    /// nothing is dropped.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// How long to keep reading a process's pipes after it exited.
    #[serde(default = "default_drain_ms")]
    pub drain_ms: u64,
}

fn default_event_buffer() -> usize {
    256
}

fn default_drain_ms() -> u64 {
    250
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            event_buffer: default_event_buffer(),
            drain_ms: default_drain_ms(),
        }
    }
}

/// `[project.<id>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    /// Direct project dependencies (ids of other `[project.<id>]` sections).
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Tasks declared on this project, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[project.<id>.task.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskConfig {
    /// Prerequisites: `"build"` (same project) or `"^build"` (this project
    /// and its direct project dependencies).
    #[serde(default)]
    pub depends_on: Vec<DependencyDecl>,
}

/// One entry of a task's `depends_on` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DependencyDecl {
    Named(String),
    /// Object-form declarations (`{ projects = [...], target = "..." }`).
    /// Parsed so they can be reported, never resolved.
    Structured(toml::Table),
    /// Any other non-string value (numbers, booleans, arrays, ...).
    Other(toml::Value),
}

impl DependencyDecl {
    pub fn named(name: impl Into<String>) -> Self {
        DependencyDecl::Named(name.into())
    }
}

impl fmt::Display for DependencyDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyDecl::Named(name) => write!(f, "\"{name}\""),
            DependencyDecl::Structured(table) => {
                let inline = table
                    .iter()
                    .map(|(k, v)| format!("{k} = {v}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{ {inline} }}")
            }
            DependencyDecl::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Value of a `[select]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    Enabled(bool),
    Options(SelectionOptions),
}

impl Selection {
    /// `false` entries are inert; `true` and option tables select.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Selection::Enabled(false))
    }

    pub fn status_matchers(&self) -> &[(String, StatusValue)] {
        match self {
            Selection::Enabled(_) => &[],
            Selection::Options(opts) => &opts.status_matchers.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SelectionOptions {
    /// Regex → status, in declaration order (later entries win ties).
    #[serde(default)]
    pub status_matchers: OrderedTable<StatusValue>,
}

/// A TOML table deserialized as a list of entries in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedTable<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedTable<V> {
    fn default() -> Self {
        OrderedTable(Vec::new())
    }
}

impl<V> OrderedTable<V> {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedTable<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = OrderedTable<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedTable(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}
