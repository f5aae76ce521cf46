// src/tui/render.rs

//! Drawing the dashboard with ratatui.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use crate::status::strip_all;
use crate::tui::dashboard::{Dashboard, Focus, HitAreas, glyph_for};

/// Render the whole dashboard into `frame`.
///
/// Also records the widget areas and the pane height in the dashboard, so
/// pointer input and paging refer to what is actually on screen.
pub fn draw(frame: &mut Frame<'_>, dashboard: &mut Dashboard) {
    let width = dashboard.list_width_percent();
    let [list_area, pane_area] = Layout::horizontal([
        Constraint::Percentage(width),
        Constraint::Percentage(100 - width),
    ])
    .areas(frame.area());

    let list_block = block(" Tasks ", dashboard.focus() == Focus::List);
    let list_inner = list_block.inner(list_area);
    let frame_index = dashboard.spinner_frame();
    let items: Vec<ListItem<'_>> = dashboard
        .rows()
        .iter()
        .map(|row| {
            ListItem::new(Line::from(vec![
                glyph_for(row.status, frame_index),
                Span::raw(" "),
                Span::raw(row.label.clone()),
            ]))
        })
        .collect();
    let list = List::new(items).block(list_block).highlight_style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_stateful_widget(list, list_area, dashboard.list_state_mut());

    let title = dashboard
        .selected()
        .and_then(|id| dashboard.rows().get(id.0))
        .map(|row| format!(" {} ", row.label))
        .unwrap_or_default();
    let pane_block = block(&title, dashboard.focus() == Focus::Pane);
    let pane_inner = pane_block.inner(pane_area);
    draw_pane(frame, dashboard, pane_block, pane_area, pane_inner);

    dashboard.set_hit_areas(HitAreas {
        list: list_inner,
        pane: pane_area,
    });
}

fn draw_pane(
    frame: &mut Frame<'_>,
    dashboard: &mut Dashboard,
    block: Block<'_>,
    area: Rect,
    inner: Rect,
) {
    let pane = dashboard.pane_mut();
    pane.set_viewport(usize::from(inner.height));
    // Only the visible window is stripped; the log itself keeps its escapes.
    let lines: Vec<Line<'_>> = pane
        .visible_lines()
        .map(|line| Line::raw(strip_all(line)))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn block(title: &str, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title.to_string())
}
