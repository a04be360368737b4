//! Sidebar: the open buffers plus language and service status.
//!
//! Each buffer row shows its language and the first non-blank line of its
//! text. The active buffer is the list selection.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use quill_core::types::Buffer;
use quill_core::Session;

use crate::app::{AppState, PanelFocus};
use crate::textarea::TextArea;
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

const PREVIEW_CHARS: usize = 18;

/// Renders the sidebar panel.
///
/// # Arguments
///
/// * `frame` — current render frame
/// * `area` — the sidebar rect (includes borders)
/// * `state` — supplies focus and the list selection
/// * `session` — supplies buffers, the active id, and service status
/// * `theme` — active color theme
pub fn render_sidebar(
    frame: &mut Frame,
    area: Rect,
    state: &mut AppState,
    session: &Session<TextArea>,
    theme: &Theme,
) {
    let store = session.store();
    let is_focused = state.focus == PanelFocus::Sidebar;
    let title = format!("Buffers ({})", store.buffers().len());
    frame.render_widget(panel_block(title, is_focused, theme), area);

    let [list_area, info_area] = inner_rect(area)
        .layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(2)]));

    let active = store.active_id();
    let items: Vec<ListItem> = store
        .buffers()
        .iter()
        .enumerate()
        .map(|(i, b)| buffer_item(i, b, b.id == active, theme))
        .collect();
    state
        .sidebar_state
        .select(store.buffers().iter().position(|b| b.id == active));

    let list = List::new(items).highlight_style(
        Style::default().fg(theme.sidebar_active).add_modifier(Modifier::BOLD),
    );
    frame.render_stateful_widget(list, list_area, &mut state.sidebar_state);

    let (service_text, service_color) = match session.backend_available() {
        Some(true) => ("online", theme.status_online),
        Some(false) => ("offline", theme.status_offline),
        None => ("checking...", theme.muted),
    };
    let info = vec![
        Line::from(vec![
            Span::styled("lang    ", Style::default().fg(theme.muted)),
            Span::raw(store.selected_language().to_string()),
        ]),
        Line::from(vec![
            Span::styled("service ", Style::default().fg(theme.muted)),
            Span::styled(service_text, Style::default().fg(service_color)),
        ]),
    ];
    frame.render_widget(Paragraph::new(info), info_area);
}

/// Row format: `1 python  def add(a, b):`.
fn buffer_item(index: usize, buffer: &Buffer, is_active: bool, theme: &Theme) -> ListItem<'static> {
    let marker = if is_active { "▶" } else { " " };
    let preview: String = buffer
        .text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("(empty)")
        .chars()
        .take(PREVIEW_CHARS)
        .collect();
    let mut label = Style::default();
    if buffer.generation_in_flight {
        label = label.add_modifier(Modifier::ITALIC);
    }
    ListItem::new(Line::from(vec![
        Span::raw(format!("{marker}{} ", index + 1)),
        Span::styled(format!("{:<6}", buffer.language.file_extension()), Style::default().fg(theme.muted)),
        Span::styled(preview, label),
    ]))
}
