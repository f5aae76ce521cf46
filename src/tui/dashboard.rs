// src/tui/dashboard.rs

//! Dashboard view model.
//!
//! Holds everything the renderer needs that is not task state: the rows,
//! which one is selected, which widget has focus, the spinner frame and the
//! scroll position of the detail pane. It is mutated only by the session
//! core, one event at a time.

use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use ratatui::widgets::ListState;

use crate::tui::input::UiEvent;
use crate::types::{StatusValue, TaskId};

pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Lines moved per mouse wheel notch.
const WHEEL_STEP: usize = 3;

/// Status glyph of a row; `frame` only matters while loading.
pub fn glyph_for(status: StatusValue, frame: usize) -> Span<'static> {
    match status {
        StatusValue::Loading => Span::styled(
            SPINNER_FRAMES[frame % SPINNER_FRAMES.len()],
            Style::default().fg(Color::Cyan),
        ),
        StatusValue::Success => Span::styled("✓", Style::default().fg(Color::Green)),
        StatusValue::Warning => Span::styled("!", Style::default().fg(Color::Yellow)),
        StatusValue::Error => Span::styled("✗", Style::default().fg(Color::Red)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Pane,
}

#[derive(Debug, Clone)]
pub struct Row {
    pub label: String,
    pub status: StatusValue,
}

/// What the session has to do after the dashboard handled an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    Nothing,
    Redraw,
    /// The selection moved; the pane must be loaded with this task's log.
    Select(TaskId),
}

/// Scrollable view of one task's raw log.
#[derive(Debug, Default)]
pub struct DetailPane {
    content: String,
    /// Byte offset where each line starts.
    line_starts: Vec<usize>,
    /// First visible line when not following.
    scroll: usize,
    /// Stick to the end of the log.
    follow: bool,
    /// Visible height from the last render.
    viewport: usize,
}

impl DetailPane {
    pub fn new() -> Self {
        Self {
            line_starts: vec![0],
            follow: true,
            ..Self::default()
        }
    }

    /// Replace the content and jump to the end.
    pub fn replace(&mut self, text: &str) {
        self.content.clear();
        self.line_starts.clear();
        self.line_starts.push(0);
        self.push(text);
        self.follow = true;
    }

    /// Append newly arrived text and jump to the end.
    pub fn append(&mut self, text: &str) {
        self.push(text);
        self.follow = true;
    }

    fn push(&mut self, text: &str) {
        let base = self.content.len();
        self.line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| base + i + 1),
        );
        self.content.push_str(text);
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of displayable lines; a trailing newline does not open a new
    /// one.
    pub fn line_count(&self) -> usize {
        match self.line_starts.last() {
            Some(&last) if last == self.content.len() && last > 0 => self.line_starts.len() - 1,
            _ => self.line_starts.len(),
        }
    }

    /// Line `index` without its line terminator.
    pub fn line(&self, index: usize) -> Option<&str> {
        if index >= self.line_count() {
            return None;
        }
        let start = self.line_starts[index];
        let end = self
            .line_starts
            .get(index + 1)
            .map(|next| next - 1)
            .unwrap_or(self.content.len());
        let line = &self.content[start..end];
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    pub fn set_viewport(&mut self, height: usize) {
        self.viewport = height;
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    fn max_top(&self) -> usize {
        self.line_count().saturating_sub(self.viewport)
    }

    /// First visible line for the current viewport.
    pub fn top(&self) -> usize {
        if self.follow {
            self.max_top()
        } else {
            self.scroll.min(self.max_top())
        }
    }

    /// Lines currently in view.
    pub fn visible_lines(&self) -> impl Iterator<Item = &str> {
        let top = self.top();
        let end = (top + self.viewport).min(self.line_count());
        (top..end).filter_map(move |i| self.line(i))
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.top().saturating_sub(lines);
        self.follow = false;
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let target = self.top() + lines;
        if target >= self.max_top() {
            self.follow = true;
        } else {
            self.scroll = target;
            self.follow = false;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
        self.follow = self.max_top() == 0;
    }

    pub fn scroll_to_end(&mut self) {
        self.follow = true;
    }
}

/// Widget areas from the last render, for pointer hit-testing.
#[derive(Debug, Clone, Copy, Default)]
pub struct HitAreas {
    /// Inner area of the task list (without borders).
    pub list: Rect,
    /// Outer area of the detail pane.
    pub pane: Rect,
}

#[derive(Debug)]
pub struct Dashboard {
    rows: Vec<Row>,
    list_state: ListState,
    focus: Focus,
    frame: usize,
    pane: DetailPane,
    areas: HitAreas,
    list_width_percent: u16,
}

impl Dashboard {
    /// One row per label, in order. The first row starts selected.
    pub fn new(labels: impl IntoIterator<Item = String>, list_width_percent: u16) -> Self {
        let rows: Vec<Row> = labels
            .into_iter()
            .map(|label| Row {
                label,
                status: StatusValue::Loading,
            })
            .collect();
        let selected = if rows.is_empty() { None } else { Some(0) };

        Self {
            rows,
            list_state: ListState::default().with_selected(selected),
            focus: Focus::List,
            frame: 0,
            pane: DetailPane::new(),
            areas: HitAreas::default(),
            list_width_percent,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn selected(&self) -> Option<TaskId> {
        self.list_state.selected().map(TaskId)
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn spinner_frame(&self) -> usize {
        self.frame
    }

    pub fn pane(&self) -> &DetailPane {
        &self.pane
    }

    pub fn pane_mut(&mut self) -> &mut DetailPane {
        &mut self.pane
    }

    pub fn list_state_mut(&mut self) -> &mut ListState {
        &mut self.list_state
    }

    pub fn list_width_percent(&self) -> u16 {
        self.list_width_percent
    }

    pub fn set_hit_areas(&mut self, areas: HitAreas) {
        self.areas = areas;
    }

    /// Advance the spinner.
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % SPINNER_FRAMES.len();
    }

    pub fn set_status(&mut self, task: TaskId, status: StatusValue) {
        if let Some(row) = self.rows.get_mut(task.0) {
            row.status = status;
        }
    }

    /// Show `task` with its full log, scrolled to the end.
    pub fn show(&mut self, task: TaskId, log: &str) {
        if task.0 < self.rows.len() {
            self.list_state.select(Some(task.0));
            self.pane.replace(log);
        }
    }

    /// New output for `task`; only the selected task reaches the pane.
    pub fn task_output(&mut self, task: TaskId, text: &str) -> bool {
        if self.selected() == Some(task) {
            self.pane.append(text);
            true
        } else {
            false
        }
    }

    pub fn handle(&mut self, event: UiEvent) -> DashboardAction {
        match event {
            UiEvent::FocusNext | UiEvent::FocusPrev => {
                self.focus = match self.focus {
                    Focus::List => Focus::Pane,
                    Focus::Pane => Focus::List,
                };
                DashboardAction::Redraw
            }
            UiEvent::Up => match self.focus {
                Focus::List => self.move_selection(-1),
                Focus::Pane => self.scroll(|p| p.scroll_up(1)),
            },
            UiEvent::Down => match self.focus {
                Focus::List => self.move_selection(1),
                Focus::Pane => self.scroll(|p| p.scroll_down(1)),
            },
            UiEvent::Home => match self.focus {
                Focus::List => self.select_index(0),
                Focus::Pane => self.scroll(DetailPane::scroll_to_top),
            },
            UiEvent::End => match self.focus {
                Focus::List => self.select_index(self.rows.len().saturating_sub(1)),
                Focus::Pane => self.scroll(DetailPane::scroll_to_end),
            },
            UiEvent::PageUp if self.focus == Focus::Pane => {
                self.scroll(|p| p.scroll_up(p.viewport().max(1)))
            }
            UiEvent::PageDown if self.focus == Focus::Pane => {
                self.scroll(|p| p.scroll_down(p.viewport().max(1)))
            }
            UiEvent::PageUp | UiEvent::PageDown => DashboardAction::Nothing,
            UiEvent::Click { column, row } => self.click(Position::new(column, row)),
            UiEvent::ScrollUp { column, row } => self.wheel(Position::new(column, row), -1),
            UiEvent::ScrollDown { column, row } => self.wheel(Position::new(column, row), 1),
            UiEvent::Resize => DashboardAction::Redraw,
            // Handled by the session before it gets here.
            UiEvent::Interrupt { .. } => DashboardAction::Nothing,
        }
    }

    fn scroll(&mut self, f: impl FnOnce(&mut DetailPane)) -> DashboardAction {
        f(&mut self.pane);
        DashboardAction::Redraw
    }

    fn move_selection(&mut self, delta: isize) -> DashboardAction {
        let Some(current) = self.list_state.selected() else {
            return DashboardAction::Nothing;
        };
        let target = current.saturating_add_signed(delta);
        self.select_index(target.min(self.rows.len().saturating_sub(1)))
    }

    fn select_index(&mut self, index: usize) -> DashboardAction {
        if index >= self.rows.len() || self.list_state.selected() == Some(index) {
            return DashboardAction::Nothing;
        }
        DashboardAction::Select(TaskId(index))
    }

    fn click(&mut self, at: Position) -> DashboardAction {
        if self.areas.list.contains(at) {
            self.focus = Focus::List;
            let index = self.list_state.offset() + usize::from(at.y - self.areas.list.y);
            match self.select_index(index) {
                DashboardAction::Nothing => DashboardAction::Redraw,
                action => action,
            }
        } else if self.areas.pane.contains(at) {
            self.focus = Focus::Pane;
            DashboardAction::Redraw
        } else {
            DashboardAction::Nothing
        }
    }

    fn wheel(&mut self, at: Position, delta: isize) -> DashboardAction {
        if self.areas.pane.contains(at) {
            if delta < 0 {
                self.scroll(|p| p.scroll_up(WHEEL_STEP))
            } else {
                self.scroll(|p| p.scroll_down(WHEEL_STEP))
            }
        } else if self.areas.list.contains(at) {
            self.move_selection(delta)
        } else {
            DashboardAction::Nothing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard(n: usize) -> Dashboard {
        Dashboard::new((0..n).map(|i| format!("p{i}:serve")), 30)
    }

    #[test]
    fn first_row_starts_selected() {
        let d = dashboard(3);
        assert_eq!(d.selected(), Some(TaskId(0)));
        assert_eq!(d.focus(), Focus::List);
        assert_eq!(dashboard(0).selected(), None);
    }

    #[test]
    fn list_navigation_requests_selection() {
        let mut d = dashboard(3);
        assert_eq!(d.handle(UiEvent::Up), DashboardAction::Nothing);
        assert_eq!(d.handle(UiEvent::Down), DashboardAction::Select(TaskId(1)));
        assert_eq!(d.handle(UiEvent::End), DashboardAction::Select(TaskId(2)));
        d.show(TaskId(2), "log");
        assert_eq!(d.handle(UiEvent::Down), DashboardAction::Nothing);
        assert_eq!(d.handle(UiEvent::Home), DashboardAction::Select(TaskId(0)));
    }

    #[test]
    fn focus_cycles_without_touching_selection() {
        let mut d = dashboard(2);
        d.show(TaskId(1), "");
        assert_eq!(d.handle(UiEvent::FocusNext), DashboardAction::Redraw);
        assert_eq!(d.focus(), Focus::Pane);
        assert_eq!(d.handle(UiEvent::FocusPrev), DashboardAction::Redraw);
        assert_eq!(d.focus(), Focus::List);
        assert_eq!(d.selected(), Some(TaskId(1)));
    }

    #[test]
    fn output_reaches_pane_only_for_selected_task() {
        let mut d = dashboard(2);
        d.show(TaskId(0), "boot\n");
        assert!(d.task_output(TaskId(0), "ready\n"));
        assert!(!d.task_output(TaskId(1), "other\n"));
        assert_eq!(d.pane().content(), "boot\nready\n");
    }

    #[test]
    fn spinner_wraps() {
        let mut d = dashboard(1);
        for _ in 0..SPINNER_FRAMES.len() {
            d.tick();
        }
        assert_eq!(d.spinner_frame(), 0);
        assert_eq!(glyph_for(StatusValue::Loading, 1).content, "⠙");
        assert_eq!(glyph_for(StatusValue::Error, 1).content, "✗");
    }

    #[test]
    fn pane_splits_lines_and_follows_the_tail() {
        let mut pane = DetailPane::new();
        pane.replace("a\nb\r\nc\nd\n");
        pane.set_viewport(2);
        assert_eq!(pane.line_count(), 4);
        assert_eq!(pane.visible_lines().collect::<Vec<_>>(), vec!["c", "d"]);

        pane.scroll_up(2);
        assert!(!pane.is_following());
        assert_eq!(pane.visible_lines().collect::<Vec<_>>(), vec!["a", "b"]);

        // New data re-tails.
        pane.append("e");
        assert!(pane.is_following());
        assert_eq!(pane.visible_lines().collect::<Vec<_>>(), vec!["d", "e"]);
    }

    #[test]
    fn scrolling_down_to_the_bottom_resumes_following() {
        let mut pane = DetailPane::new();
        pane.replace("1\n2\n3\n4\n5\n");
        pane.set_viewport(2);
        pane.scroll_to_top();
        assert_eq!(pane.top(), 0);
        pane.scroll_down(1);
        assert_eq!(pane.top(), 1);
        pane.scroll_down(10);
        assert!(pane.is_following());
        assert_eq!(pane.top(), 3);
    }

    #[test]
    fn click_selects_row_under_pointer() {
        let mut d = dashboard(3);
        d.set_hit_areas(HitAreas {
            list: Rect::new(1, 1, 20, 10),
            pane: Rect::new(22, 0, 40, 12),
        });
        d.handle(UiEvent::FocusNext);
        assert_eq!(
            d.handle(UiEvent::Click { column: 3, row: 3 }),
            DashboardAction::Select(TaskId(2))
        );
        assert_eq!(d.focus(), Focus::List);
        assert_eq!(d.handle(UiEvent::Click { column: 30, row: 5 }), DashboardAction::Redraw);
        assert_eq!(d.focus(), Focus::Pane);
        assert_eq!(d.handle(UiEvent::Click { column: 0, row: 20 }), DashboardAction::Nothing);
    }
}
