//! Review panel: summary, one card per diagnostic, and a preview of what
//! "apply corrections" would change.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
    Frame,
};
use similar::{ChangeTag, TextDiff};

use quill_core::types::{Diagnostic, ReviewReport, Severity};
use quill_core::{MarkerSeverity, Session};

use crate::app::{AppState, PanelFocus};
use crate::textarea::TextArea;
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Unchanged lines kept around each change in the preview.
const CONTEXT_LINES: usize = 2;

/// Renders the review panel.
///
/// # Arguments
///
/// * `frame` — current render frame
/// * `area` — the review rect (includes borders)
/// * `state` — supplies focus and scroll; receives the viewport height
/// * `session` — supplies the report and the reviewed buffer's text
/// * `theme` — active color theme
pub fn render_review(
    frame: &mut Frame,
    area: Rect,
    state: &mut AppState,
    session: &Session<TextArea>,
    theme: &Theme,
) {
    let is_focused = state.focus == PanelFocus::Review;
    let inner = inner_rect(area);
    state.review_viewport_height = inner.height;

    let title = if session.review_in_flight() { "Review (running)" } else { "Review" };
    frame.render_widget(panel_block(title, is_focused, theme), area);

    let text = match session.review_report() {
        Some(report) => {
            let original = session
                .review_buffer_id()
                .and_then(|id| session.store().get(id))
                .map_or("", |b| b.text.as_str());
            report_text(report, original, theme)
        }
        None => Text::from(Line::styled("Reviewing...", Style::default().fg(theme.muted))),
    };

    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .scroll((state.review_scroll, 0)),
        inner,
    );
}

fn report_text(report: &ReviewReport, original: &str, theme: &Theme) -> Text<'static> {
    let heading = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::raw(report.summary.clone()), Line::raw("")];

    lines.push(Line::styled(format!("Issues ({})", report.diagnostics.len()), heading));
    if report.diagnostics.is_empty() {
        lines.push(Line::styled("  No issues found.", Style::default().fg(theme.muted)));
    }
    for diagnostic in &report.diagnostics {
        lines.extend(diagnostic_card(diagnostic, theme));
    }

    if let Some(corrected) = &report.corrected_text {
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("Corrected code", heading),
            Span::styled("  a apply · c close", Style::default().fg(theme.muted)),
        ]));
        lines.extend(correction_preview(original, corrected, theme));
    }
    Text::from(lines)
}

fn diagnostic_card(diagnostic: &Diagnostic, theme: &Theme) -> Vec<Line<'static>> {
    let color = theme.marker(MarkerSeverity::from(diagnostic.severity));
    let badge = match diagnostic.severity {
        Severity::Error => " ERROR ",
        Severity::Warning => " WARN ",
        Severity::Suggestion => " HINT ",
    };
    let mut card = vec![
        Line::from(vec![
            Span::styled(badge, Style::default().fg(color).add_modifier(Modifier::REVERSED)),
            Span::raw(format!(" line {}", diagnostic.line)),
        ]),
        Line::raw(format!("  {}", diagnostic.message)),
    ];
    if !diagnostic.suggestion.is_empty() {
        card.push(Line::styled(
            format!("  ↳ {}", diagnostic.suggestion),
            Style::default().fg(theme.muted),
        ));
    }
    card
}

/// Line diff of `original` against `corrected`, with changed words inside a
/// changed line emphasised. Unchanged stretches collapse to a `⋯` separator.
pub fn correction_preview(original: &str, corrected: &str, theme: &Theme) -> Vec<Line<'static>> {
    let diff = TextDiff::from_lines(original, corrected);
    let mut out: Vec<Line<'static>> = Vec::new();

    for (i, group) in diff.grouped_ops(CONTEXT_LINES).iter().enumerate() {
        if i > 0 {
            out.push(Line::styled("  ⋯", Style::default().fg(theme.muted)));
        }
        for op in group {
            for change in diff.iter_inline_changes(op) {
                let (prefix, color) = match change.tag() {
                    ChangeTag::Delete => ("- ", theme.diff_removed),
                    ChangeTag::Insert => ("+ ", theme.diff_added),
                    ChangeTag::Equal => ("  ", theme.muted),
                };
                let base = Style::default().fg(color);
                let mut spans = vec![Span::styled(prefix, base)];
                for (emphasized, value) in change.iter_strings_lossy() {
                    let text = value.trim_end_matches('\n');
                    if text.is_empty() {
                        continue;
                    }
                    let style = if emphasized { base.add_modifier(Modifier::BOLD) } else { base };
                    spans.push(Span::styled(text.to_owned(), style));
                }
                out.push(Line::from(spans));
            }
        }
    }

    if out.is_empty() {
        out.push(Line::styled("  (identical to the current buffer)", Style::default().fg(theme.muted)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn preview_marks_replaced_line() {
        let theme = Theme::dark();
        let out = plain(&correction_preview("a = 1\nb=2\nprint(a)\n", "a = 1\nb = 2\nprint(a)\n", &theme));
        assert!(out.contains(&"- b=2".to_owned()), "{out:?}");
        assert!(out.contains(&"+ b = 2".to_owned()), "{out:?}");
        assert!(out.contains(&"  a = 1".to_owned()), "{out:?}");
    }

    #[test]
    fn identical_text_has_placeholder() {
        let theme = Theme::dark();
        let out = plain(&correction_preview("x\n", "x\n", &theme));
        assert_eq!(out, vec!["  (identical to the current buffer)".to_owned()]);
    }
}
