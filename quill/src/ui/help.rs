//! Help overlay: a centred modal listing every keybinding.
//!
//! Drawn inside the same `terminal.draw()` closure as the panels; `Clear`
//! erases the area first so the panels underneath do not bleed through.

use ratatui::{
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::Theme;

/// Renders the help overlay, scrolled by `help_scroll` rows.
///
/// Skipped on terminals narrower than 60 columns.
///
/// # Arguments
///
/// * `frame` — current render frame
/// * `theme` — active color theme
/// * `help_scroll` — vertical scroll offset
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(70), Constraint::Percentage(80));
    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help · j/k scroll, ? or Esc to dismiss ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn section(title: &'static str) -> Line<'static> {
    Line::styled(title, Style::default().add_modifier(Modifier::BOLD))
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        section("Buffers"),
        Line::from("  n             New buffer in the selected language"),
        Line::from("  [ / ]         Previous / next buffer"),
        Line::from("  l             Cycle the active buffer's language"),
        Line::from(""),
        section("Editing"),
        Line::from("  i             Insert mode (Esc to leave)"),
        Line::from("  . ( [ { ' \"   Typing a trigger character asks for completions"),
        Line::from("  Ctrl-Space    Ask for completions now"),
        Line::from("  Tab / Enter   Accept the highlighted completion"),
        Line::from("  Up / Down     Move through the completion menu"),
        Line::from("  # comment ⏎   A comment line followed by Enter generates code"),
        Line::from(""),
        section("Assist"),
        Line::from("  r             Review the active buffer"),
        Line::from("  a             Apply the review's corrected code"),
        Line::from("  c             Close the review and clear its markers"),
        Line::from("  x             Run the active buffer"),
        Line::from("  o             Close the output panel"),
        Line::from(""),
        section("Navigation"),
        Line::from("  H / L         Move focus left / right"),
        Line::from("  b             Show / hide the sidebar"),
        Line::from("  j / k         Move cursor, switch buffer, or scroll"),
        Line::from("  g / G         Top / bottom"),
        Line::from("  Ctrl-d / u    Half page down / up"),
        Line::from(""),
        section("General"),
        Line::from("  ?             Open / close this help"),
        Line::from("  q             Quit"),
    ])
}
