// src/tui/input.rs

//! Terminal input: mapping crossterm events to dashboard intents, and the
//! blocking listener thread that feeds them to the session.

use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// User intent understood by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// Ctrl-C (from the keyboard or a `SIGINT` delivered to us).
    Interrupt { at: Instant },
    FocusNext,
    FocusPrev,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Click { column: u16, row: u16 },
    ScrollUp { column: u16, row: u16 },
    ScrollDown { column: u16, row: u16 },
    Resize,
}

/// Translate one terminal event; `None` for anything the dashboard ignores.
pub fn map_event(event: Event, now: Instant) -> Option<UiEvent> {
    match event {
        Event::Key(key) => map_key(key, now),
        Event::Mouse(mouse) => map_mouse(mouse),
        Event::Resize(_, _) => Some(UiEvent::Resize),
        _ => None,
    }
}

fn map_key(key: KeyEvent, now: Instant) -> Option<UiEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(UiEvent::Interrupt { at: now }),
            _ => None,
        };
    }

    let ui = match key.code {
        KeyCode::Tab => UiEvent::FocusNext,
        KeyCode::BackTab => UiEvent::FocusPrev,
        KeyCode::Up | KeyCode::Char('k') => UiEvent::Up,
        KeyCode::Down | KeyCode::Char('j') => UiEvent::Down,
        KeyCode::PageUp => UiEvent::PageUp,
        KeyCode::PageDown => UiEvent::PageDown,
        KeyCode::Home | KeyCode::Char('g') => UiEvent::Home,
        KeyCode::End | KeyCode::Char('G') => UiEvent::End,
        _ => return None,
    };
    Some(ui)
}

fn map_mouse(mouse: MouseEvent) -> Option<UiEvent> {
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(UiEvent::Click { column, row }),
        MouseEventKind::ScrollUp => Some(UiEvent::ScrollUp { column, row }),
        MouseEventKind::ScrollDown => Some(UiEvent::ScrollDown { column, row }),
        _ => None,
    }
}

/// Read terminal events on a dedicated thread until the receiver is gone.
///
/// crossterm's `read` blocks, so this cannot live on the Tokio runtime.
pub fn spawn_input_listener(tx: mpsc::Sender<UiEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    warn!(error = %err, "polling terminal input failed; input disabled");
                    break;
                }
            }

            let ev = match event::read() {
                Ok(ev) => ev,
                Err(err) => {
                    warn!(error = %err, "reading terminal input failed; input disabled");
                    break;
                }
            };

            if let Some(ui) = map_event(ev, Instant::now()) {
                if tx.blocking_send(ui).is_err() {
                    break;
                }
            }
        }
        debug!("input listener stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn ctrl_c_is_an_interrupt_stamped_with_now() {
        let now = Instant::now();
        assert_eq!(
            map_event(press(KeyCode::Char('c'), KeyModifiers::CONTROL), now),
            Some(UiEvent::Interrupt { at: now })
        );
        // A bare 'c' does nothing.
        assert_eq!(map_event(press(KeyCode::Char('c'), KeyModifiers::NONE), now), None);
    }

    #[test]
    fn navigation_keys() {
        let now = Instant::now();
        let cases = [
            (KeyCode::Tab, UiEvent::FocusNext),
            (KeyCode::BackTab, UiEvent::FocusPrev),
            (KeyCode::Char('k'), UiEvent::Up),
            (KeyCode::Down, UiEvent::Down),
            (KeyCode::End, UiEvent::End),
            (KeyCode::PageUp, UiEvent::PageUp),
        ];
        for (code, expected) in cases {
            assert_eq!(map_event(press(code, KeyModifiers::NONE), now), Some(expected));
        }
    }

    #[test]
    fn key_release_is_ignored() {
        let mut key = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(map_event(Event::Key(key), Instant::now()), None);
    }

    #[test]
    fn mouse_click_and_wheel() {
        let mouse = |kind| {
            Event::Mouse(MouseEvent {
                kind,
                column: 4,
                row: 7,
                modifiers: KeyModifiers::NONE,
            })
        };
        let now = Instant::now();
        assert_eq!(
            map_event(mouse(MouseEventKind::Down(MouseButton::Left)), now),
            Some(UiEvent::Click { column: 4, row: 7 })
        );
        assert_eq!(
            map_event(mouse(MouseEventKind::ScrollDown), now),
            Some(UiEvent::ScrollDown { column: 4, row: 7 })
        );
        assert_eq!(map_event(mouse(MouseEventKind::Moved), now), None);
    }
}
