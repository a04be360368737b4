//! Panel layout for quill.
//!
//! Pure layout arithmetic, recomputed every frame from the live terminal size.
//!
//! # Panel geometry
//!
//! | Terminal width | Layout |
//! |----------------|--------|
//! | `< 100` cols   | Sidebar collapsed; editor plus the tool column |
//! | `>= 100` cols  | Sidebar (unless toggled off with `b`), editor, and the tool column |
//!
//! The tool column on the right holds the review panel and/or the output
//! panel, and only exists while one of them has something to show.
//! `Spacing::Overlap(1)` with `MergeStrategy::Fuzzy` lets neighbouring borders
//! share a column and merge their junctions.

use ratatui::{
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
    Frame,
};

use quill_core::types::Language;

use crate::app::{AppState, Mode};
use crate::theme::Theme;

const SIDEBAR_WIDTH: u16 = 28;
const WIDE_TERMINAL: u16 = 100;

/// Outer rects for every panel. Hidden panels are zero-sized.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelRects {
    pub sidebar: Rect,
    pub editor: Rect,
    pub review: Rect,
    pub output: Rect,
    pub status_bar: Rect,
}

/// Splits `area` into panels.
///
/// # Arguments
///
/// * `area` — the full frame area
/// * `show_sidebar` — whether the user wants the sidebar
/// * `show_review` — whether the review panel has content
/// * `show_output` — whether the output panel has content
pub fn compute_layout(
    area: Rect,
    show_sidebar: bool,
    show_review: bool,
    show_output: bool,
) -> PanelRects {
    let [main_area, status_bar] =
        area.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let sidebar_width =
        if show_sidebar && area.width >= WIDE_TERMINAL { SIDEBAR_WIDTH } else { 0 };
    let tools_pct = if show_review || show_output { 40 } else { 0 };

    let [sidebar, editor, tools] = main_area.layout(
        &Layout::horizontal([
            Constraint::Length(sidebar_width),
            Constraint::Fill(1),
            Constraint::Percentage(tools_pct),
        ])
        .spacing(Spacing::Overlap(1)),
    );

    let (review, output) = match (show_review, show_output) {
        (true, true) => {
            let [review, output] = tools.layout(
                &Layout::vertical([Constraint::Percentage(60), Constraint::Fill(1)])
                    .spacing(Spacing::Overlap(1)),
            );
            (review, output)
        }
        (true, false) => (tools, Rect::default()),
        (false, true) => (Rect::default(), tools),
        (false, false) => (Rect::default(), Rect::default()),
    };

    PanelRects { sidebar, editor, review, output, status_bar }
}

/// Inner rect of a bordered panel.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Bordered block for a panel: thick and highlighted when focused, plain otherwise.
pub fn panel_block<'a>(title: impl Into<Line<'a>>, is_focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the one-row status bar: mode, active language, cursor, and any
/// transient message.
///
/// # Arguments
///
/// * `frame` — current render frame
/// * `area` — the status bar row
/// * `state` — supplies mode and the transient message
/// * `language` — active buffer's language
/// * `cursor` — active cursor as `(line, column)`
/// * `theme` — active color theme
pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    language: Language,
    cursor: (usize, usize),
    theme: &Theme,
) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Insert => (" INSERT ", theme.status_mode_insert),
        Mode::Normal | Mode::HelpOverlay => (" NORMAL ", theme.status_mode_normal),
    };

    let mut spans = vec![
        Span::styled(mode_text, Style::default().fg(mode_fg).add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {language}  Ln {}, Col {} ", cursor.0, cursor.1)),
    ];
    if let Some(message) = state.flash() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(message.to_owned(), Style::default().add_modifier(Modifier::BOLD)));
    }
    spans.push(Span::styled("  ? help", Style::default().fg(theme.muted)));

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_terminal_hides_sidebar() {
        let rects = compute_layout(Rect::new(0, 0, 80, 24), true, false, false);
        assert_eq!(rects.sidebar.width, 0);
        assert_eq!(rects.review.width, 0);
        assert!(rects.editor.width >= 78);
        assert_eq!(rects.status_bar.height, 1);
    }

    #[test]
    fn tool_column_stacks_review_over_output() {
        let rects = compute_layout(Rect::new(0, 0, 160, 40), true, true, true);
        assert!(rects.sidebar.width > 0);
        assert!(rects.review.width > 0 && rects.output.width > 0);
        assert_eq!(rects.review.x, rects.output.x);
        assert!(rects.review.y < rects.output.y);
    }

    #[test]
    fn toggled_off_sidebar_gives_editor_the_room() {
        let area = Rect::new(0, 0, 160, 40);
        let shown = compute_layout(area, true, false, false);
        let hidden = compute_layout(area, false, false, false);
        assert_eq!(hidden.sidebar.width, 0);
        assert!(hidden.editor.width > shown.editor.width);
        assert_eq!(hidden.editor.x, 0);
    }
}
