use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex};

use devboard::exec::{CommandSpec, OutputMode, ProcessLauncher, TokioLauncher};
use tokio::process::Child;

/// A launcher that:
/// - records every command it was asked to start
/// - runs a shell script instead, picked by the first command argument that
///   equals a registered key (`app:serve` for watch tasks, the task name for
///   prerequisite batches)
/// - fails to spawn, like a missing program would, when no key matches.
#[derive(Clone, Default)]
pub struct ScriptLauncher {
    scripts: BTreeMap<String, String>,
    launched: Arc<Mutex<Vec<CommandSpec>>>,
}

impl ScriptLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, key: &str, script: &str) -> Self {
        self.scripts.insert(key.to_string(), script.to_string());
        self
    }

    /// Commands seen so far, in launch order.
    pub fn launched(&self) -> Vec<CommandSpec> {
        self.launched.lock().unwrap().clone()
    }
}

impl ProcessLauncher for ScriptLauncher {
    fn spawn(&self, spec: &CommandSpec, output: OutputMode) -> io::Result<Child> {
        self.launched.lock().unwrap().push(spec.clone());

        let script = spec
            .args
            .iter()
            .find_map(|arg| self.scripts.get(arg))
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no script for `{spec}`"))
            })?;

        let shell = CommandSpec::new("sh", ["-c", script.as_str()]).in_dir(spec.cwd.clone());
        TokioLauncher.spawn(&shell, output)
    }
}
