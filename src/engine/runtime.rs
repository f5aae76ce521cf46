// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::Backend;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::TaskEvent;
use crate::tui::UiEvent;
use crate::tui::render;

use super::core::SessionCore;
use super::{SessionCommand, SessionEvent, SessionOutcome};

/// Drives the session core from process events, terminal input and the
/// spinner tick, and draws the dashboard.
///
/// This is a pure IO shell around [`SessionCore`], which contains all the
/// session semantics. All task state is touched from this single loop; the
/// process pumps and the input thread only send messages.
///
/// Task logs are not `Send`, so `run` must be awaited directly rather than
/// handed to `tokio::spawn`.
pub struct Session<B: Backend> {
    core: SessionCore,
    terminal: Terminal<B>,
    task_rx: mpsc::Receiver<TaskEvent>,
    input_rx: mpsc::Receiver<UiEvent>,
    tick: Duration,
}

impl<B: Backend> fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("core", &self.core)
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> Session<B> {
    pub fn new(
        core: SessionCore,
        terminal: Terminal<B>,
        task_rx: mpsc::Receiver<TaskEvent>,
        input_rx: mpsc::Receiver<UiEvent>,
        tick: Duration,
    ) -> Self {
        Self {
            core,
            terminal,
            task_rx,
            input_rx,
            tick,
        }
    }

    pub fn core(&self) -> &SessionCore {
        &self.core
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Main event loop.
    ///
    /// - Waits for the next process event, input event or tick.
    /// - Feeds it (and every process event already queued) into the core.
    /// - Executes the resulting commands and redraws once per batch.
    pub async fn run(&mut self) -> Result<SessionOutcome> {
        info!(tasks = self.core.arena().len(), "dashboard session started");
        if let Some(outcome) = self.core.outcome() {
            return Ok(outcome);
        }

        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.draw()?;

        let outcome = 'session: loop {
            let event = tokio::select! {
                Some(ev) = self.task_rx.recv() => SessionEvent::Process(ev),
                Some(ev) = self.input_rx.recv() => SessionEvent::Input(ev),
                _ = ticker.tick() => SessionEvent::Tick,
            };

            let mut redraw = false;
            if let Some(outcome) = self.apply(event, &mut redraw) {
                break 'session outcome;
            }

            // Catch up on output that is already waiting before drawing.
            while let Ok(ev) = self.task_rx.try_recv() {
                if let Some(outcome) = self.apply(SessionEvent::Process(ev), &mut redraw) {
                    break 'session outcome;
                }
            }

            if redraw {
                self.draw()?;
            }
        };

        // Final state, e.g. the last error glyph.
        self.draw()?;
        Ok(outcome)
    }

    /// Feed one event to the core and execute its commands. Returns the
    /// outcome once the core stops.
    fn apply(&mut self, event: SessionEvent, redraw: &mut bool) -> Option<SessionOutcome> {
        if !matches!(event, SessionEvent::Tick) {
            debug!(?event, "session received event");
        }
        let step = self.core.step(event);
        *redraw |= step.redraw;

        for command in step.commands {
            match command {
                SessionCommand::Signal { tasks, signal } => {
                    for task in tasks {
                        if !self.core.signal(task, signal) {
                            debug!(task = %task, ?signal, "task no longer running; signal skipped");
                        }
                    }
                }
                SessionCommand::ForceExit => {
                    info!("forced exit requested");
                }
            }
        }

        if step.keep_running {
            None
        } else {
            let outcome = self.core.outcome();
            info!(?outcome, "session finished");
            outcome
        }
    }

    fn draw(&mut self) -> Result<()> {
        let core = &mut self.core;
        self.terminal
            .draw(|frame| render::draw(frame, core.dashboard_mut()))?;
        Ok(())
    }
}
