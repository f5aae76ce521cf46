// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod status;
pub mod tui;
pub mod types;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::dag::{WatchTaskSpec, WorkspaceGraph, resolve_prerequisites, select_watch_tasks};
use crate::engine::{Session, SessionCore, TaskArena};
use crate::exec::{
    ProcessLauncher, RunnerTemplate, Supervisor, TokioLauncher, group_prerequisites,
    run_prerequisite_batches,
};
use crate::tui::{Dashboard, TerminalGuard, UiEvent, spawn_input_listener};
use crate::types::{TaskId, TaskRef};

/// What a run is going to do, worked out from the workspace file alone.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Watch tasks in dashboard order.
    pub watch: Vec<WatchTaskSpec>,
    /// One-shot tasks that must finish before any watch task starts.
    pub prerequisites: BTreeSet<TaskRef>,
    pub runner: RunnerTemplate,
}

/// Select the watch tasks and resolve their prerequisites.
///
/// `root_dir` is where relative runner paths are anchored (normally the
/// directory of the workspace file).
pub fn plan(cfg: &ConfigFile, root_dir: &Path) -> crate::errors::Result<Plan> {
    let graph = WorkspaceGraph::from_config(cfg);
    let watch = select_watch_tasks(&cfg.select, &graph)?;
    let requested: Vec<TaskRef> = watch.iter().map(|w| w.task_ref.clone()).collect();
    let prerequisites = resolve_prerequisites(&requested, &graph)?;
    let runner = RunnerTemplate::from_config(&cfg.runner, root_dir);

    info!(
        watch = watch.len(),
        prerequisites = prerequisites.len(),
        "planned dashboard session"
    );

    Ok(Plan {
        watch,
        prerequisites,
        runner,
    })
}

/// Build the session for `watch` and launch every watch process.
///
/// Rows follow the order of `watch`. The returned session is ready to
/// `run`; `input_rx` feeds it user input.
pub fn start_session<L, B>(
    watch: Vec<WatchTaskSpec>,
    runner: &RunnerTemplate,
    cfg: &ConfigFile,
    launcher: L,
    terminal: Terminal<B>,
    input_rx: mpsc::Receiver<UiEvent>,
) -> Session<B>
where
    L: ProcessLauncher,
    B: Backend,
{
    let (event_tx, event_rx) = mpsc::channel(cfg.supervisor.event_buffer);
    let supervisor = Supervisor::new(
        launcher,
        event_tx,
        Duration::from_millis(cfg.supervisor.drain_ms),
    );

    let commands: Vec<_> = watch
        .iter()
        .map(|w| runner.watch_command(&w.task_ref))
        .collect();
    let dashboard = Dashboard::new(
        watch.iter().map(|w| w.display_name.clone()),
        cfg.dashboard.list_width_percent,
    );
    let mut core = SessionCore::new(
        TaskArena::new(watch),
        dashboard,
        Duration::from_millis(cfg.dashboard.interrupt_window_ms),
    );

    for (index, command) in commands.iter().enumerate() {
        let task = TaskId(index);
        let handle = supervisor.launch(task, command);
        core.attach_process(task, handle);
    }

    Session::new(
        core,
        terminal,
        event_rx,
        input_rx,
        Duration::from_millis(cfg.dashboard.tick_ms),
    )
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and planning
/// - the prerequisite batches
/// - the terminal, input listener and Ctrl-C handling
/// - the watch processes and the dashboard session
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let root_dir = config_root_dir(&config_path);
    let plan = plan(&cfg, &root_dir)?;

    if args.dry_run {
        print_dry_run(&plan);
        return Ok(());
    }

    let groups = group_prerequisites(&plan.prerequisites);
    run_prerequisite_batches(&groups, &plan.runner, &TokioLauncher).await?;

    let (input_tx, input_rx) = mpsc::channel::<UiEvent>(64);
    let (guard, terminal) = TerminalGuard::enter()?;
    spawn_input_listener(input_tx.clone());
    spawn_signal_listener(input_tx);

    let mut session = start_session(
        plan.watch,
        &plan.runner,
        &cfg,
        TokioLauncher,
        terminal,
        input_rx,
    );
    let outcome = session.run().await;

    drop(session);
    drop(guard);
    let outcome = outcome?;
    info!(?outcome, "devboard finished");
    Ok(())
}

/// Turn `SIGINT`s that do not come through the terminal (e.g. `kill -INT`)
/// into the same interrupt the Ctrl-C key produces.
fn spawn_signal_listener(tx: mpsc::Sender<UiEvent>) {
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            let event = UiEvent::Interrupt { at: Instant::now() };
            if tx.send(event).await.is_err() {
                return;
            }
        }
    });
}

/// Figure out the workspace root.
///
/// - If the config path has a non-empty parent (e.g. "tools/Devboard.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Devboard.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Simple dry-run output: watch tasks, their commands and the batches.
fn print_dry_run(plan: &Plan) {
    println!("devboard dry-run");
    println!();

    println!("watch tasks ({}):", plan.watch.len());
    for watch in &plan.watch {
        println!("  - {}", watch.display_name);
        println!("      cmd: {}", plan.runner.watch_command(&watch.task_ref));
        for matcher in &watch.matchers {
            println!("      status: /{}/ -> {}", matcher.pattern.as_str(), matcher.status);
        }
    }
    println!();

    let groups = group_prerequisites(&plan.prerequisites);
    if groups.is_empty() {
        println!("prerequisites: none");
    } else {
        println!("prerequisite batches ({}):", groups.len());
        for (task, projects) in &groups {
            println!("  - {task} on [{}]", projects.join(", "));
            println!("      cmd: {}", plan.runner.batch_command(task, projects));
        }
    }

    debug!("dry-run complete (no execution)");
}
