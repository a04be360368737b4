//! Syntax highlighting with syntect.
//!
//! Highlighting a buffer is linear in its length and stateful from the first
//! line, so results are cached per buffer and recomputed only when the
//! widget's revision or the buffer id changes.

use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme as SyntectTheme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use quill_core::types::Language;

use crate::textarea::TextArea;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEMES: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Spans for one source line, without its terminator.
pub type HighlightedLine = Vec<Span<'static>>;

/// Loads the syntax and theme sets so the first frame does not stall.
pub fn warm_up() {
    let _ = &*SYNTAXES;
    let _ = &*THEMES;
}

fn syntax_for(language: Language) -> &'static SyntaxReference {
    let by_ext = |ext: &str| SYNTAXES.find_syntax_by_extension(ext);
    by_ext(language.file_extension())
        // The bundled set has no TypeScript grammar; JavaScript is close enough.
        .or_else(|| (language == Language::TypeScript).then(|| by_ext("js")).flatten())
        .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text())
}

fn syntect_theme() -> Option<&'static SyntectTheme> {
    THEMES
        .themes
        .get("base16-ocean.dark")
        .or_else(|| THEMES.themes.values().next())
}

/// Converts a syntect style to a ratatui style. The background is dropped so
/// the editor's own cursor-line background shows through.
fn to_style(style: syntect::highlighting::Style) -> Style {
    let fg = style.foreground;
    let mut out = Style::default();
    if fg.a > 0 {
        out = out.fg(Color::Rgb(fg.r, fg.g, fg.b));
    }
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

/// Highlights every line of `lines` as `language`.
///
/// Lines that syntect fails on come back as a single unstyled span.
pub fn highlight(lines: &[String], language: Language) -> Vec<HighlightedLine> {
    let Some(theme) = syntect_theme() else {
        return lines.iter().map(|l| vec![Span::raw(l.clone())]).collect();
    };
    let mut highlighter = HighlightLines::new(syntax_for(language), theme);

    lines
        .iter()
        .map(|line| {
            let with_newline = format!("{line}\n");
            match highlighter.highlight_line(&with_newline, &SYNTAXES) {
                Ok(ranges) => ranges
                    .into_iter()
                    .map(|(style, text)| (style, text.trim_end_matches('\n')))
                    .filter(|(_, text)| !text.is_empty())
                    .map(|(style, text)| Span::styled(text.to_owned(), to_style(style)))
                    .collect(),
                Err(_) => vec![Span::raw(line.clone())],
            }
        })
        .collect()
}

/// Highlighted lines of the most recently rendered buffer.
#[derive(Debug, Default)]
pub struct HighlightCache {
    key: Option<(String, u64)>,
    lines: Vec<HighlightedLine>,
}

impl HighlightCache {
    /// Returns highlighted lines for `area`, recomputing only when stale.
    pub fn get(&mut self, buffer_id: &str, area: &TextArea) -> &[HighlightedLine] {
        let fresh = self
            .key
            .as_ref()
            .is_some_and(|(id, rev)| id == buffer_id && *rev == area.revision());
        if !fresh {
            self.lines = highlight(area.lines(), area.language());
            self.key = Some((buffer_id.to_owned(), area.revision()));
        }
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_line_is_covered() {
        let lines = vec!["def f():".to_owned(), String::new(), "    return 1".to_owned()];
        let out = highlight(&lines, Language::Python);
        assert_eq!(out.len(), 3);
        let rendered: Vec<String> = out
            .iter()
            .map(|spans| spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(rendered, lines);
    }

    #[test]
    fn every_language_has_a_syntax() {
        for language in Language::ALL {
            let _ = syntax_for(language);
        }
    }
}
