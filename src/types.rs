use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Identifies a task on a project: `project:task`.
///
/// The `Display` form is canonical and parses back via `FromStr`, so a
/// `TaskRef` can be used as a string key when talking to external tools.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskRef {
    pub project: String,
    pub task: String,
}

impl TaskRef {
    pub fn new(project: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            task: task.into(),
        }
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project, self.task)
    }
}

impl FromStr for TaskRef {
    type Err = String;

    /// Splits on the first `:`; task names may themselves contain colons
    /// (`app:test:unit`), project names may not.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((project, task)) if !project.is_empty() && !task.is_empty() => {
                Ok(TaskRef::new(project, task))
            }
            _ => Err(format!(
                "invalid task reference '{s}' (expected \"project:task\")"
            )),
        }
    }
}

/// Stable index of a watch task within one session (its dashboard row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub usize);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Health of a watch task as inferred from its log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusValue {
    /// No status matcher has fired yet.
    #[default]
    Loading,
    Success,
    Warning,
    Error,
}

impl FromStr for StatusValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "loading" => Ok(StatusValue::Loading),
            "success" => Ok(StatusValue::Success),
            "warning" => Ok(StatusValue::Warning),
            "error" => Ok(StatusValue::Error),
            other => Err(format!(
                "invalid status '{other}' (expected loading, success, warning or error)"
            )),
        }
    }
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusValue::Loading => "loading",
            StatusValue::Success => "success",
            StatusValue::Warning => "warning",
            StatusValue::Error => "error",
        };
        f.write_str(s)
    }
}

/// Signal forwarded to a supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// `SIGINT`, what the dashboard sends on Ctrl-C.
    Interrupt,
    /// `SIGTERM`.
    Terminate,
    /// `SIGKILL`.
    Kill,
}
