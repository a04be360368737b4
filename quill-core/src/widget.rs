//! Capability interface the session controller drives a text widget through.
//!
//! The widget owns rendering, cursor, and its own undo stack. The core only
//! needs to read text and cursor, make atomic edits, attach markers, and hand
//! over completion items. Widgets are registered per buffer id in a
//! [`WidgetRegistry`] instead of living behind a global.

use std::collections::HashMap;

use crate::types::{CompletionItem, Language, Position, Severity, VisibleRange};

/// Marker owner under which review diagnostics are published.
pub const REVIEW_MARKER_OWNER: &str = "code-review";

/// Marker severities on the widget's numeric scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerSeverity {
    Hint = 1,
    Info = 2,
    Warning = 4,
    Error = 8,
}

impl From<Severity> for MarkerSeverity {
    /// Exhaustive mapping from review severity to marker severity.
    ///
    /// Suggestions, and unknown remote types that already decoded as
    /// suggestions, land on the lowest level.
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => MarkerSeverity::Error,
            Severity::Warning => MarkerSeverity::Warning,
            Severity::Suggestion => MarkerSeverity::Hint,
        }
    }
}

/// An inline annotation on a line range. Columns are 1-based; `end_column`
/// is exclusive, as in the widget's own range model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub severity: MarkerSeverity,
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: String,
}

/// Everything the core needs from a mounted text widget.
///
/// `line_count`, `line_content` and `line_max_column` have default
/// implementations over [`EditorWidget::text`]; widgets with their own line
/// storage should override them.
pub trait EditorWidget {
    /// Full current text.
    fn text(&self) -> String;

    /// Replaces the entire text as one edit.
    fn set_value(&mut self, text: &str);

    /// Inserts `text` at `at` as one edit. Out-of-range positions clamp to
    /// the nearest valid position.
    fn insert_text(&mut self, at: Position, text: &str);

    /// Current cursor position.
    fn cursor(&self) -> Position;

    /// Line ranges currently scrolled into view.
    fn visible_ranges(&self) -> Vec<VisibleRange>;

    /// Switches syntax mode.
    fn set_language(&mut self, language: Language);

    /// Replaces every marker owned by `owner`. An empty list clears them.
    fn set_markers(&mut self, owner: &str, markers: Vec<Marker>);

    /// Delivers completion items for a session anchored at `anchor`.
    ///
    /// The widget discards them if its completion session has since moved on.
    fn show_completions(&mut self, anchor: Position, items: Vec<CompletionItem>);

    fn line_count(&self) -> usize {
        crate::window::line_count(&self.text())
    }

    /// Content of 1-based `line`, without its newline.
    fn line_content(&self, line: usize) -> Option<String> {
        if line == 0 {
            return None;
        }
        self.text().split('\n').nth(line - 1).map(str::to_owned)
    }

    /// One past the last column of `line` (1 for an empty or missing line).
    fn line_max_column(&self, line: usize) -> usize {
        self.line_content(line).map_or(1, |l| l.chars().count() + 1)
    }
}

/// Mounted widgets keyed by buffer id.
#[derive(Debug)]
pub struct WidgetRegistry<W> {
    widgets: HashMap<String, W>,
}

impl<W> Default for WidgetRegistry<W> {
    fn default() -> Self {
        Self { widgets: HashMap::new() }
    }
}

impl<W: EditorWidget> WidgetRegistry<W> {
    /// Registers `widget` for `buffer_id`, returning any widget it replaces.
    pub fn mount(&mut self, buffer_id: &str, widget: W) -> Option<W> {
        self.widgets.insert(buffer_id.to_owned(), widget)
    }

    pub fn get(&self, buffer_id: &str) -> Option<&W> {
        self.widgets.get(buffer_id)
    }

    pub fn get_mut(&mut self, buffer_id: &str) -> Option<&mut W> {
        self.widgets.get_mut(buffer_id)
    }
}
