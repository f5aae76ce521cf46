// src/tui/mod.rs

//! Terminal dashboard.
//!
//! - [`dashboard`] is the view model (rows, selection, focus, detail pane).
//! - [`render`] draws it with ratatui.
//! - [`input`] maps crossterm events to [`UiEvent`]s.
//! - [`terminal`] owns raw mode and the alternate screen.

pub mod dashboard;
pub mod input;
pub mod render;
pub mod terminal;

pub use dashboard::{Dashboard, DashboardAction, DetailPane, Focus, glyph_for};
pub use input::{UiEvent, map_event, spawn_input_listener};
pub use terminal::{DashboardTerminal, TerminalGuard};
