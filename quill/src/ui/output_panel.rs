//! Output panel: stdout, stderr, and timing of the last remote run.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Text},
    widgets::{Paragraph, Wrap},
    Frame,
};

use quill_core::types::ExecutionResult;
use quill_core::Session;

use crate::app::{AppState, PanelFocus};
use crate::textarea::TextArea;
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Renders the output panel.
///
/// # Arguments
///
/// * `frame` — current render frame
/// * `area` — the output rect (includes borders)
/// * `state` — supplies focus and scroll; receives the viewport height
/// * `session` — supplies the execution result
/// * `theme` — active color theme
pub fn render_output(
    frame: &mut Frame,
    area: Rect,
    state: &mut AppState,
    session: &Session<TextArea>,
    theme: &Theme,
) {
    let is_focused = state.focus == PanelFocus::Output;
    let inner = inner_rect(area);
    state.output_viewport_height = inner.height;

    let title = match session.execution_result() {
        Some(result) if result.is_error() => "Output (error) · o close",
        _ => "Output · o close",
    };
    frame.render_widget(panel_block(title, is_focused, theme), area);

    let text = match session.execution_result() {
        Some(result) => result_text(result, theme),
        None => Text::from(Line::styled("Running...", Style::default().fg(theme.muted))),
    };
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .scroll((state.output_scroll, 0)),
        inner,
    );
}

fn result_text(result: &ExecutionResult, theme: &Theme) -> Text<'static> {
    let mut lines: Vec<Line<'static>> = result
        .stdout
        .lines()
        .map(|l| Line::styled(l.to_owned(), Style::default().fg(theme.output_ok)))
        .collect();
    if let Some(stderr) = result.stderr.as_deref().filter(|s| !s.is_empty()) {
        lines.extend(
            stderr
                .lines()
                .map(|l| Line::styled(l.to_owned(), Style::default().fg(theme.output_err))),
        );
    }
    if lines.is_empty() {
        lines.push(Line::styled("(no output)", Style::default().fg(theme.muted)));
    }
    if let Some(ms) = result.duration_ms {
        lines.push(Line::raw(""));
        lines.push(Line::styled(format!("Finished in {ms} ms"), Style::default().fg(theme.muted)));
    }
    Text::from(lines)
}
