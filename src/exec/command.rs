// src/exec/command.rs

//! Turning tasks into concrete command lines.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::model::RunnerSection;
use crate::types::TaskRef;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder regex is valid"));

/// Names of the `{placeholder}`s used in a template argument.
pub fn placeholders(arg: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(arg)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

fn expand(arg: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(arg, |caps: &Captures<'_>| {
            let name = &caps[1];
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// A fully expanded external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: PathBuf::from("."),
        }
    }

    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Command templates from `[runner]`, bound to a working directory.
#[derive(Debug, Clone)]
pub struct RunnerTemplate {
    program: String,
    run_args: Vec<String>,
    batch_args: Vec<String>,
    cwd: PathBuf,
}

impl RunnerTemplate {
    /// `root_dir` is the directory of the workspace file; a relative
    /// `[runner].cwd` is resolved against it.
    pub fn from_config(runner: &RunnerSection, root_dir: &Path) -> Self {
        let cwd = match runner.cwd.as_deref() {
            Some(dir) if Path::new(dir).is_absolute() => PathBuf::from(dir),
            Some(dir) => root_dir.join(dir),
            None => root_dir.to_path_buf(),
        };

        Self {
            program: runner.program.clone(),
            run_args: runner.run_args.clone(),
            batch_args: runner.batch_args.clone(),
            cwd,
        }
    }

    /// Command for one long-running watch task.
    pub fn watch_command(&self, task: &TaskRef) -> CommandSpec {
        let target = task.to_string();
        let vars = [
            ("target", target.as_str()),
            ("project", task.project.as_str()),
            ("task", task.task.as_str()),
        ];
        self.build(&self.run_args, &vars)
    }

    /// Command running `task` on all of `projects` in one invocation.
    pub fn batch_command(&self, task: &str, projects: &[String]) -> CommandSpec {
        let joined = projects.join(",");
        let vars = [("task", task), ("projects", joined.as_str())];
        self.build(&self.batch_args, &vars)
    }

    fn build(&self, args: &[String], vars: &[(&str, &str)]) -> CommandSpec {
        CommandSpec {
            program: self.program.clone(),
            args: args.iter().map(|a| expand(a, vars)).collect(),
            cwd: self.cwd.clone(),
        }
    }
}
