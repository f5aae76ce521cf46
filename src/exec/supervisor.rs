// src/exec/supervisor.rs

//! One supervised process per watch task.
//!
//! Every launched process gets its own Tokio task that pumps stdout and
//! stderr into the shared event channel, waits for exit, and forwards
//! signals requested through its [`ProcessHandle`]. Exactly one terminal
//! event (`Exited` or `SpawnFailed`) is sent per launch, and no `Data`
//! event for that task follows it.

use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use crate::exec::backend::{OutputMode, ProcessLauncher};
use crate::exec::command::CommandSpec;
use crate::types::{Signal, TaskId};

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// How a supervised process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    Code(i32),
    /// Killed by this signal number (Unix).
    Signal(i32),
    /// Exit status could not be determined.
    Unknown,
}

impl From<ExitStatus> for ExitKind {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitKind::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitKind::Signal(signal);
            }
        }
        ExitKind::Unknown
    }
}

/// Lifecycle event of one supervised process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// A chunk of combined stdout/stderr output.
    Data(Vec<u8>),
    /// The process exited. Terminal.
    Exited(ExitKind),
    /// The process could not be started. Terminal.
    SpawnFailed(String),
}

impl ProcessEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProcessEvent::Data(_))
    }
}

/// A [`ProcessEvent`] tagged with the task it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEvent {
    pub task: TaskId,
    pub event: ProcessEvent,
}

/// Control handle for a launched process.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    pid: Option<u32>,
    control: Option<mpsc::UnboundedSender<Signal>>,
}

impl ProcessHandle {
    /// Handle for a process that never started; `terminate` is a no-op.
    pub fn detached() -> Self {
        Self {
            pid: None,
            control: None,
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Forward `signal` to the process.
    ///
    /// Returns `false` without doing anything if the process already exited
    /// (or never started).
    pub fn terminate(&self, signal: Signal) -> bool {
        match &self.control {
            Some(tx) => tx.send(signal).is_ok(),
            None => false,
        }
    }
}

/// Launches watch-task processes and reports their events.
pub struct Supervisor<L: ProcessLauncher> {
    launcher: Arc<L>,
    events: mpsc::Sender<TaskEvent>,
    drain: Duration,
}

impl<L: ProcessLauncher> Supervisor<L> {
    /// `drain` bounds how long output is still read after the process has
    /// exited (a grandchild may keep the pipes open).
    pub fn new(launcher: L, events: mpsc::Sender<TaskEvent>, drain: Duration) -> Self {
        Self {
            launcher: Arc::new(launcher),
            events,
            drain,
        }
    }

    /// Start `spec` for `task`. Must be called from within a Tokio runtime.
    ///
    /// Spawn failures are not returned; they arrive as
    /// [`ProcessEvent::SpawnFailed`] like any other event for the task.
    pub fn launch(&self, task: TaskId, spec: &CommandSpec) -> ProcessHandle {
        info!(task = %task, cmd = %spec, cwd = %spec.cwd.display(), "starting watch process");

        let child = match self.launcher.spawn(spec, OutputMode::Capture) {
            Ok(child) => child,
            Err(err) => {
                warn!(task = %task, cmd = %spec, error = %err, "failed to spawn watch process");
                let events = self.events.clone();
                let message = format!("failed to spawn `{spec}`: {err}");
                tokio::spawn(async move {
                    let _ = events
                        .send(TaskEvent {
                            task,
                            event: ProcessEvent::SpawnFailed(message),
                        })
                        .await;
                });
                return ProcessHandle::detached();
            }
        };

        let pid = child.id();
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        tokio::spawn(supervise(
            task,
            child,
            control_rx,
            self.events.clone(),
            self.drain,
        ));

        ProcessHandle {
            pid,
            control: Some(control_tx),
        }
    }
}

async fn supervise(
    task: TaskId,
    mut child: Child,
    mut control: mpsc::UnboundedReceiver<Signal>,
    events: mpsc::Sender<TaskEvent>,
    drain: Duration,
) {
    let mut pumps: Vec<JoinHandle<()>> = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        pumps.push(tokio::spawn(pump(task, stdout, events.clone())));
    }
    if let Some(stderr) = child.stderr.take() {
        pumps.push(tokio::spawn(pump(task, stderr, events.clone())));
    }

    let status = loop {
        tokio::select! {
            status = child.wait() => break status,
            Some(signal) = control.recv() => forward_signal(task, &mut child, signal),
        }
    };
    // Nothing can be signalled any more.
    control.close();

    let exit = match status {
        Ok(status) => ExitKind::from(status),
        Err(err) => {
            warn!(task = %task, error = %err, "waiting for watch process failed");
            ExitKind::Unknown
        }
    };
    info!(task = %task, exit = ?exit, "watch process exited");

    let deadline = Instant::now() + drain;
    for mut pump in pumps {
        if timeout_at(deadline, &mut pump).await.is_err() {
            debug!(task = %task, "output still open after exit; dropping the rest");
            pump.abort();
            let _ = pump.await;
        }
    }

    let _ = events
        .send(TaskEvent {
            task,
            event: ProcessEvent::Exited(exit),
        })
        .await;
}

async fn pump<R>(task: TaskId, mut reader: R, events: mpsc::Sender<TaskEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let event = TaskEvent {
                    task,
                    event: ProcessEvent::Data(buf[..n].to_vec()),
                };
                if events.send(event).await.is_err() {
                    break;
                }
            }
            Err(err) => {
                debug!(task = %task, error = %err, "output stream read failed");
                break;
            }
        }
    }
}

fn forward_signal(task: TaskId, child: &mut Child, signal: Signal) {
    debug!(task = %task, ?signal, "forwarding signal to watch process");
    if let Err(err) = send_signal(child, signal) {
        warn!(task = %task, ?signal, error = %err, "failed to signal watch process");
    }
}

#[cfg(unix)]
fn send_signal(child: &mut Child, signal: Signal) -> std::io::Result<()> {
    use nix::sys::signal::{Signal as NixSignal, kill};
    use nix::unistd::Pid;

    // `id()` is `None` once the child has been reaped.
    let Some(pid) = child.id() else {
        return Ok(());
    };
    let sig = match signal {
        Signal::Interrupt => NixSignal::SIGINT,
        Signal::Terminate => NixSignal::SIGTERM,
        Signal::Kill => NixSignal::SIGKILL,
    };
    kill(Pid::from_raw(pid as i32), sig).map_err(std::io::Error::from)
}

#[cfg(not(unix))]
fn send_signal(child: &mut Child, _signal: Signal) -> std::io::Result<()> {
    child.start_kill()
}
