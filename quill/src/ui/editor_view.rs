//! Editor panel renderer.
//!
//! Only the visible slice of the buffer is turned into `Line`s each frame.
//! Syntax spans come from the highlight cache; lines carrying a marker get an
//! underline and a severity badge in the gutter. The completion popup is drawn
//! last, anchored under the cursor.

use ratatui::{
    layout::{Position as ScreenPosition, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use quill_core::widget::EditorWidget;

use crate::app::{AppState, Mode, PanelFocus};
use crate::textarea::{CompletionMenu, TextArea};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

const POPUP_MAX_ROWS: u16 = 8;
const POPUP_WIDTH: u16 = 44;

/// Renders the editor panel for the active buffer.
///
/// Caches the inner height into the widget so `visible_ranges` and page
/// movement reflect what is actually on screen.
///
/// # Arguments
///
/// * `frame` — current render frame
/// * `area` — the editor rect (includes borders)
/// * `state` — supplies focus, mode, and the highlight cache
/// * `buffer_id` — id of the active buffer
/// * `widget` — the active buffer's widget
/// * `theme` — active color theme
pub fn render_editor(
    frame: &mut Frame,
    area: Rect,
    state: &mut AppState,
    buffer_id: &str,
    widget: &mut TextArea,
    theme: &Theme,
) {
    let is_focused = state.focus == PanelFocus::Editor;
    let inner = inner_rect(area);
    widget.set_viewport_height(usize::from(inner.height));

    let title = format!("{} ", widget.language());
    frame.render_widget(panel_block(title, is_focused, theme), area);

    let total = widget.line_count();
    let gutter_width = total.to_string().len().max(3) + 2;
    let cursor = widget.cursor();
    let start = widget.scroll().min(total.saturating_sub(1));
    let end = (start + usize::from(inner.height)).min(total);

    let highlighted = state.highlight.get(buffer_id, widget);
    let mut lines: Vec<Line> = Vec::with_capacity(end - start);
    for row in start..end {
        let line_no = row + 1;
        let severity = widget.markers_on_line(line_no).map(|m| m.severity).max();

        let gutter_style = if line_no == cursor.line {
            Style::default().fg(theme.gutter_active)
        } else {
            Style::default().fg(theme.gutter)
        };
        let badge = match severity {
            Some(s) => Span::styled("●", Style::default().fg(theme.marker(s))),
            None => Span::raw(" "),
        };
        let mut spans = vec![
            badge,
            Span::styled(format!("{line_no:>width$} ", width = gutter_width - 2), gutter_style),
        ];

        let content = highlighted.get(row).cloned().unwrap_or_default();
        match severity {
            Some(s) => spans.extend(content.into_iter().map(|span| {
                let style = span.style.add_modifier(Modifier::UNDERLINED);
                let style = if span.style.fg.is_none() { style.fg(theme.marker(s)) } else { style };
                span.style(style)
            })),
            None => spans.extend(content),
        }

        let mut line = Line::from(spans);
        if line_no == cursor.line && is_focused {
            line = line.style(Style::default().bg(theme.cursor_line_bg));
        }
        lines.push(line);
    }
    frame.render_widget(Paragraph::new(lines).style(Style::default().fg(theme.text)), inner);

    if !is_focused || state.mode == Mode::HelpOverlay {
        return;
    }
    let Some(screen) = cursor_screen_position(inner, widget, gutter_width) else {
        return;
    };
    frame.set_cursor_position(screen);

    if let Some(menu) = widget.menu() {
        render_completion_popup(frame, inner, screen, menu, theme);
    }
}

/// Terminal cell of the text cursor, or `None` when it is scrolled out of view.
fn cursor_screen_position(
    inner: Rect,
    widget: &TextArea,
    gutter_width: usize,
) -> Option<ScreenPosition> {
    let cursor = widget.cursor();
    let row = cursor.line.checked_sub(1 + widget.scroll())?;
    if row >= usize::from(inner.height) {
        return None;
    }
    let x = usize::from(inner.x) + gutter_width + cursor.column - 1;
    let x = u16::try_from(x).ok()?.min(inner.right().saturating_sub(1));
    Some(ScreenPosition::new(x, inner.y + row as u16))
}

/// Draws the completion list under the cursor, or above it when there is no
/// room below.
fn render_completion_popup(
    frame: &mut Frame,
    inner: Rect,
    cursor: ScreenPosition,
    menu: &CompletionMenu,
    theme: &Theme,
) {
    let rows = (menu.items.len() as u16).min(POPUP_MAX_ROWS);
    let width = POPUP_WIDTH.min(inner.width);
    let below = cursor.y + 1;
    let y = if below + rows <= inner.bottom() {
        below
    } else {
        cursor.y.saturating_sub(rows).max(inner.y)
    };
    let x = cursor.x.min(inner.right().saturating_sub(width));
    let popup = Rect::new(x, y, width, rows).intersection(inner);
    if popup.is_empty() {
        return;
    }

    let items: Vec<ListItem> = menu
        .items
        .iter()
        .map(|item| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<5}", item.kind.short_label()),
                    Style::default().fg(theme.popup_kind),
                ),
                Span::raw(item.label.clone()),
                Span::styled(format!("  {}", item.detail), Style::default().fg(theme.muted)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .style(Style::default().bg(theme.popup_bg).fg(theme.text))
        .highlight_style(Style::default().bg(theme.popup_selected_bg).add_modifier(Modifier::BOLD));
    let mut list_state = ListState::default().with_selected(Some(menu.selected));

    frame.render_widget(Clear, popup);
    frame.render_stateful_widget(list, popup, &mut list_state);
}
