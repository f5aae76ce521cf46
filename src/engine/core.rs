// src/engine/core.rs

//! Pure session state machine.
//!
//! [`SessionCore`] consumes [`SessionEvent`]s and produces a [`SessionStep`]
//! describing what the IO shell should do next (signal processes, redraw,
//! stop). It owns the task arena and the dashboard model and has no
//! channels, no Tokio types and no terminal, so it is unit tested directly.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::engine::state::TaskArena;
use crate::engine::{SessionCommand, SessionEvent, SessionOutcome, SessionStep};
use crate::exec::{ProcessEvent, ProcessHandle, TaskEvent};
use crate::tui::{Dashboard, DashboardAction, UiEvent};
use crate::types::{Signal, TaskId};

#[derive(Debug)]
pub struct SessionCore {
    arena: TaskArena,
    dashboard: Dashboard,
    interrupt_window: Duration,
    last_interrupt: Option<Instant>,
    outcome: Option<SessionOutcome>,
}

impl SessionCore {
    /// `interrupt_window`: a second interrupt within this long after the
    /// first ends the session without waiting for the processes.
    pub fn new(arena: TaskArena, mut dashboard: Dashboard, interrupt_window: Duration) -> Self {
        if let Some(first) = dashboard.selected() {
            let log = arena.get(first).map(|t| t.log.raw()).unwrap_or_default();
            dashboard.show(first, log);
        }
        let outcome = arena.all_exited().then_some(SessionOutcome::AllExited);

        Self {
            arena,
            dashboard,
            interrupt_window,
            last_interrupt: None,
            outcome,
        }
    }

    pub fn arena(&self) -> &TaskArena {
        &self.arena
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }

    /// How the session ended, once it has.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    /// Remember the handle of a freshly launched process.
    pub fn attach_process(&mut self, task: TaskId, handle: ProcessHandle) {
        if let Some(state) = self.arena.get_mut(task) {
            if !state.exited() {
                state.process = Some(handle);
            }
        }
    }

    /// Forward `signal` to `task` if its process is still live.
    pub fn signal(&self, task: TaskId, signal: Signal) -> bool {
        self.arena
            .get(task)
            .and_then(|t| t.process.as_ref())
            .is_some_and(|p| p.terminate(signal))
    }

    /// Handle a single event, updating state and returning the commands for
    /// the IO shell.
    pub fn step(&mut self, event: SessionEvent) -> SessionStep {
        if self.outcome.is_some() {
            return SessionStep::stop(Vec::new());
        }

        match event {
            SessionEvent::Process(event) => self.on_process_event(event),
            SessionEvent::Tick => {
                self.dashboard.tick();
                SessionStep::redraw()
            }
            SessionEvent::Input(UiEvent::Interrupt { at }) => self.on_interrupt(at),
            SessionEvent::Input(ui) => self.on_input(ui),
        }
    }

    fn on_process_event(&mut self, TaskEvent { task, event }: TaskEvent) -> SessionStep {
        let Some(state) = self.arena.get_mut(task) else {
            debug!(task = %task, "event for unknown task ignored");
            return SessionStep::idle();
        };
        if state.exited() {
            return SessionStep::idle();
        }

        match event {
            ProcessEvent::Data(chunk) => {
                let added = state.record_output(&chunk);
                let status = state.status;
                self.dashboard.set_status(task, status);
                self.dashboard.task_output(task, &added);
                SessionStep::redraw()
            }
            ProcessEvent::Exited(_) | ProcessEvent::SpawnFailed(_) => {
                if let ProcessEvent::SpawnFailed(message) = &event {
                    let line = format!("{message}\n");
                    let added = state.record_output(line.as_bytes());
                    self.dashboard.task_output(task, &added);
                }
                state.mark_exited();
                info!(task = %state.display_name, ?event, "watch task finished");
                self.dashboard.set_status(task, state.status);

                if self.arena.all_exited() {
                    info!("all watch tasks have exited");
                    self.outcome = Some(SessionOutcome::AllExited);
                    return SessionStep::stop(Vec::new());
                }
                SessionStep::redraw()
            }
        }
    }

    fn on_interrupt(&mut self, at: Instant) -> SessionStep {
        let repeated = self
            .last_interrupt
            .is_some_and(|prev| at.saturating_duration_since(prev) <= self.interrupt_window);

        if repeated {
            info!("second interrupt; leaving without waiting for watch tasks");
            self.outcome = Some(SessionOutcome::ForcedExit);
            return SessionStep::stop(vec![SessionCommand::ForceExit]);
        }

        self.last_interrupt = Some(at);
        let tasks = self.arena.live();
        info!(live = tasks.len(), "interrupt; signalling live watch tasks");
        SessionStep {
            commands: vec![SessionCommand::Signal {
                tasks,
                signal: Signal::Interrupt,
            }],
            keep_running: true,
            redraw: false,
        }
    }

    fn on_input(&mut self, ui: UiEvent) -> SessionStep {
        match self.dashboard.handle(ui) {
            DashboardAction::Nothing => SessionStep::idle(),
            DashboardAction::Redraw => SessionStep::redraw(),
            DashboardAction::Select(task) => {
                let log = self.arena.get(task).map(|t| t.log.raw()).unwrap_or_default();
                self.dashboard.show(task, log);
                SessionStep::redraw()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::WatchTaskSpec;
    use crate::exec::ExitKind;
    use crate::status::StatusMatcher;
    use crate::types::{StatusValue, TaskRef};

    fn core(n: usize) -> SessionCore {
        let specs: Vec<WatchTaskSpec> = (0..n)
            .map(|i| {
                let task_ref = TaskRef::new(format!("p{i}"), "serve");
                WatchTaskSpec {
                    display_name: task_ref.to_string(),
                    task_ref,
                    matchers: vec![StatusMatcher::new("ready", StatusValue::Success).unwrap()],
                }
            })
            .collect();
        let dashboard = Dashboard::new(specs.iter().map(|s| s.display_name.clone()), 30);
        SessionCore::new(TaskArena::new(specs), dashboard, Duration::from_millis(2000))
    }

    fn data(task: usize, bytes: &[u8]) -> SessionEvent {
        SessionEvent::Process(TaskEvent {
            task: TaskId(task),
            event: ProcessEvent::Data(bytes.to_vec()),
        })
    }

    fn exited(task: usize) -> SessionEvent {
        SessionEvent::Process(TaskEvent {
            task: TaskId(task),
            event: ProcessEvent::Exited(ExitKind::Code(0)),
        })
    }

    #[test]
    fn data_updates_status_and_selected_pane() {
        let mut core = core(2);
        let step = core.step(data(0, b"ready\n"));
        assert!(step.keep_running && step.redraw);
        assert_eq!(core.arena().get(TaskId(0)).unwrap().status, StatusValue::Success);
        assert_eq!(core.dashboard().rows()[0].status, StatusValue::Success);
        assert_eq!(core.dashboard().pane().content(), "ready\n");

        core.step(data(1, b"other\n"));
        assert_eq!(core.dashboard().pane().content(), "ready\n");
    }

    #[test]
    fn selecting_a_row_loads_its_full_log() {
        let mut core = core(2);
        core.step(data(1, b"one\n"));
        core.step(data(1, b"two\n"));
        core.step(SessionEvent::Input(UiEvent::Down));
        assert_eq!(core.dashboard().selected(), Some(TaskId(1)));
        assert_eq!(core.dashboard().pane().content(), "one\ntwo\n");
    }

    #[test]
    fn clean_exit_is_still_an_error_and_later_events_are_ignored() {
        let mut core = core(2);
        core.step(data(0, b"ready\n"));
        core.step(exited(0));
        let state = core.arena().get(TaskId(0)).unwrap();
        assert!(state.exited());
        assert_eq!(state.status, StatusValue::Error);

        let step = core.step(data(0, b"ready\n"));
        assert!(!step.redraw);
        assert_eq!(core.arena().get(TaskId(0)).unwrap().status, StatusValue::Error);
    }

    #[test]
    fn spawn_failure_is_logged_and_marks_error() {
        let mut core = core(2);
        core.step(SessionEvent::Process(TaskEvent {
            task: TaskId(0),
            event: ProcessEvent::SpawnFailed("failed to spawn `nx`: not found".into()),
        }));
        let state = core.arena().get(TaskId(0)).unwrap();
        assert_eq!(state.status, StatusValue::Error);
        assert!(state.log.raw().contains("not found"));
        assert!(core.outcome().is_none());
    }

    #[test]
    fn session_ends_when_last_task_exits() {
        let mut core = core(3);
        assert!(core.step(exited(2)).keep_running);
        assert!(core.step(exited(0)).keep_running);
        let step = core.step(exited(1));
        assert!(!step.keep_running);
        assert_eq!(core.outcome(), Some(SessionOutcome::AllExited));
    }

    #[test]
    fn first_interrupt_signals_live_tasks_second_forces_exit() {
        let mut core = core(3);
        core.step(exited(1));
        let t0 = Instant::now();

        let step = core.step(SessionEvent::Input(UiEvent::Interrupt { at: t0 }));
        assert!(step.keep_running);
        assert_eq!(
            step.commands,
            vec![SessionCommand::Signal {
                tasks: vec![TaskId(0), TaskId(2)],
                signal: Signal::Interrupt,
            }]
        );

        let step = core.step(SessionEvent::Input(UiEvent::Interrupt {
            at: t0 + Duration::from_millis(500),
        }));
        assert!(!step.keep_running);
        assert_eq!(step.commands, vec![SessionCommand::ForceExit]);
        assert_eq!(core.outcome(), Some(SessionOutcome::ForcedExit));
    }

    #[test]
    fn interrupts_far_apart_only_signal() {
        let mut core = core(1);
        let t0 = Instant::now();
        core.step(SessionEvent::Input(UiEvent::Interrupt { at: t0 }));
        let step = core.step(SessionEvent::Input(UiEvent::Interrupt {
            at: t0 + Duration::from_millis(2500),
        }));
        assert!(step.keep_running);
        assert!(matches!(step.commands[..], [SessionCommand::Signal { .. }]));
    }

    #[test]
    fn tick_advances_spinner() {
        let mut core = core(1);
        let step = core.step(SessionEvent::Tick);
        assert!(step.redraw);
        assert_eq!(core.dashboard().spinner_frame(), 1);
    }
}
