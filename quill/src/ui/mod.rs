//! UI rendering module for quill.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`; each
//! panel has its own file.

pub mod editor_view;
pub mod help;
pub mod keybindings;
pub mod layout;
pub mod output_panel;
pub mod review_panel;
pub mod sidebar;

use ratatui::Frame;

use quill_core::widget::EditorWidget;
use quill_core::Session;

use crate::app::{AppState, Mode};
use crate::textarea::TextArea;
use crate::theme::Theme;
use layout::{compute_layout, render_status_bar};

/// Renders one complete frame.
///
/// Panel rects are written back into `state` so mouse clicks and focus
/// cycling on the next event see what is actually on screen.
///
/// # Arguments
///
/// * `frame` — current render frame provided by `terminal.draw()`
/// * `state` — UI state; receives panel geometry
/// * `session` — editor session; the active widget's viewport is updated
/// * `theme` — active color theme
pub fn render(frame: &mut Frame, state: &mut AppState, session: &mut Session<TextArea>, theme: &Theme) {
    let show_review = session.review_report().is_some() || session.review_in_flight();
    let show_output = session.execution_result().is_some() || session.execution_in_flight();
    let rects = compute_layout(frame.area(), !state.sidebar_hidden, show_review, show_output);

    state.panel_rects = [rects.sidebar, rects.editor, rects.review, rects.output];
    state.ensure_focus_visible();

    if rects.sidebar.width > 0 {
        sidebar::render_sidebar(frame, rects.sidebar, state, session, theme);
    }
    if rects.review.width > 0 {
        review_panel::render_review(frame, rects.review, state, session, theme);
    }
    if rects.output.width > 0 {
        output_panel::render_output(frame, rects.output, state, session, theme);
    }

    let active_id = session.store().active_id().to_owned();
    let language = session.active_buffer().language;
    let mut cursor = (1, 1);
    if let Some(widget) = session.widget_mut(&active_id) {
        editor_view::render_editor(frame, rects.editor, state, &active_id, widget, theme);
        let position = widget.cursor();
        cursor = (position.line, position.column);
    }

    render_status_bar(frame, rects.status_bar, state, language, cursor, theme);

    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, state.help_scroll);
    }
}
