// src/tui/terminal.rs

//! Taking over the terminal for the dashboard, and giving it back.

use std::io::{self, Stdout};
use std::panic;
use std::sync::Once;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::debug;

use crate::errors::Result;
use crate::logging;

pub type DashboardTerminal = Terminal<CrosstermBackend<Stdout>>;

static PANIC_HOOK: Once = Once::new();

/// Raw mode, alternate screen, mouse capture and a hidden cursor for as long
/// as the guard lives.
///
/// Dropping the guard restores the terminal; a panic restores it before the
/// panic message is printed. Log output to stderr is muted in between.
#[derive(Debug)]
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn enter() -> Result<(Self, DashboardTerminal)> {
        install_panic_hook();

        enable_raw_mode()?;
        // From here on the guard owns the cleanup, even if setup fails.
        let guard = TerminalGuard { _private: () };
        logging::mute_stderr(true);

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, Hide)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;

        debug!("terminal taken over by the dashboard");
        Ok((guard, terminal))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore();
        debug!("terminal restored");
    }
}

fn restore() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show);
    logging::mute_stderr(false);
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore();
            previous(info);
        }));
    });
}
