//! A small multi-line text widget implementing [`EditorWidget`].
//!
//! Text is stored as a vector of lines without terminators. Positions are
//! 1-based lines and 1-based character columns, matching the core's model.
//! Every mutation bumps `revision`, which the renderer uses to decide when
//! syntax highlighting must be recomputed.

use std::collections::BTreeMap;

use quill_core::types::{CompletionItem, Language, Position, VisibleRange};
use quill_core::widget::{EditorWidget, Marker};

/// Spaces inserted by the Tab key.
const INDENT: &str = "    ";

/// An open completion menu. Only ever shown at the cursor it was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionMenu {
    pub anchor: Position,
    pub items: Vec<CompletionItem>,
    pub selected: usize,
}

#[derive(Debug, Clone)]
pub struct TextArea {
    lines: Vec<String>,
    cursor: Position,
    language: Language,
    /// Marker sets keyed by owner.
    markers: BTreeMap<String, Vec<Marker>>,
    menu: Option<CompletionMenu>,
    /// 0-based index of the first visible line.
    scroll: usize,
    viewport_height: usize,
    revision: u64,
}

impl Default for TextArea {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: Position::new(1, 1),
            language: Language::default(),
            markers: BTreeMap::new(),
            menu: None,
            scroll: 0,
            viewport_height: 0,
            revision: 0,
        }
    }
}

impl TextArea {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn menu(&self) -> Option<&CompletionMenu> {
        self.menu.as_ref()
    }

    /// Every marker covering `line`, across all owners.
    pub fn markers_on_line(&self, line: usize) -> impl Iterator<Item = &Marker> {
        self.markers
            .values()
            .flatten()
            .filter(move |m| m.start_line <= line && line <= m.end_line)
    }

    /// Records the rendered height. Re-scrolls only when the height changed so
    /// the cursor stays where the user left it between frames.
    pub fn set_viewport_height(&mut self, height: usize) {
        if self.viewport_height != height {
            self.viewport_height = height;
            self.scroll_to_cursor();
        }
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.insert_newline();
            return;
        }
        let mut buf = [0u8; 4];
        self.insert_at_cursor(c.encode_utf8(&mut buf));
    }

    /// Inserts pasted text at the cursor. Tabs become spaces and CRLF becomes LF.
    pub fn insert_str(&mut self, text: &str) {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n").replace('\t', INDENT);
        self.insert_at_cursor(&normalized);
    }

    /// Splits the line at the cursor, carrying the current line's indentation
    /// onto the new line.
    pub fn insert_newline(&mut self) {
        let current = &self.lines[self.cursor.line - 1];
        let indent: String = current
            .chars()
            .take(self.cursor.column - 1)
            .take_while(|c| c.is_whitespace())
            .collect();
        self.insert_at_cursor(&format!("\n{indent}"));
    }

    pub fn insert_tab(&mut self) {
        self.insert_at_cursor(INDENT);
    }

    pub fn backspace(&mut self) {
        let Position { line, column } = self.cursor;
        if column > 1 {
            let start = self.byte_offset(line, column - 1);
            let end = self.byte_offset(line, column);
            self.lines[line - 1].replace_range(start..end, "");
            self.cursor.column -= 1;
        } else if line > 1 {
            let joined_at = self.line_len(line - 1) + 1;
            let current = self.lines.remove(line - 1);
            self.lines[line - 2].push_str(&current);
            self.cursor = Position::new(line - 1, joined_at);
        } else {
            return;
        }
        self.after_edit();
    }

    pub fn delete(&mut self) {
        let Position { line, column } = self.cursor;
        if column <= self.line_len(line) {
            let start = self.byte_offset(line, column);
            let end = self.byte_offset(line, column + 1);
            self.lines[line - 1].replace_range(start..end, "");
        } else if line < self.lines.len() {
            let next = self.lines.remove(line);
            self.lines[line - 1].push_str(&next);
        } else {
            return;
        }
        self.after_edit();
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    pub fn move_left(&mut self) {
        let Position { line, column } = self.cursor;
        if column > 1 {
            self.move_to(Position::new(line, column - 1));
        } else if line > 1 {
            self.move_to(Position::new(line - 1, self.line_len(line - 1) + 1));
        }
    }

    pub fn move_right(&mut self) {
        let Position { line, column } = self.cursor;
        if column <= self.line_len(line) {
            self.move_to(Position::new(line, column + 1));
        } else if line < self.lines.len() {
            self.move_to(Position::new(line + 1, 1));
        }
    }

    /// Moves the cursor by `delta` lines, keeping the column where it fits.
    pub fn move_lines(&mut self, delta: isize) {
        let target = self.cursor.line.saturating_add_signed(delta).clamp(1, self.lines.len());
        self.move_to(Position::new(target, self.cursor.column));
    }

    pub fn move_home(&mut self) {
        self.move_to(Position::new(self.cursor.line, 1));
    }

    pub fn move_end(&mut self) {
        self.move_to(Position::new(self.cursor.line, self.line_len(self.cursor.line) + 1));
    }

    pub fn move_top(&mut self) {
        self.move_to(Position::new(1, 1));
    }

    pub fn move_bottom(&mut self) {
        self.move_to(Position::new(self.lines.len(), 1));
    }

    pub fn page(&mut self, down: bool) {
        let step = self.viewport_height.max(1) as isize;
        self.move_lines(if down { step } else { -step });
    }

    // -----------------------------------------------------------------------
    // Completion menu
    // -----------------------------------------------------------------------

    pub fn dismiss_menu(&mut self) {
        self.menu = None;
    }

    pub fn menu_next(&mut self) {
        if let Some(menu) = &mut self.menu {
            menu.selected = (menu.selected + 1) % menu.items.len();
        }
    }

    pub fn menu_prev(&mut self) {
        if let Some(menu) = &mut self.menu {
            menu.selected = menu.selected.checked_sub(1).unwrap_or(menu.items.len() - 1);
        }
    }

    /// Inserts the selected item's text at the menu anchor and closes the menu.
    ///
    /// Returns `false` when no menu was open.
    pub fn accept_completion(&mut self) -> bool {
        let Some(menu) = self.menu.take() else {
            return false;
        };
        let Some(item) = menu.items.get(menu.selected) else {
            return false;
        };
        let end = self.splice(menu.anchor, &item.insert_text);
        self.cursor = end;
        self.after_edit();
        true
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn line_len(&self, line: usize) -> usize {
        self.lines.get(line - 1).map_or(0, |l| l.chars().count())
    }

    /// Byte index of 1-based `column` in `line`; past-the-end maps to the length.
    fn byte_offset(&self, line: usize, column: usize) -> usize {
        let text = &self.lines[line - 1];
        text.char_indices().nth(column - 1).map_or(text.len(), |(i, _)| i)
    }

    /// Pulls `at` inside the document. Lines past the end map to the end of
    /// the last line; columns past a line's end map to that end.
    fn clamp(&self, at: Position) -> Position {
        let last = self.lines.len();
        if at.line > last {
            return Position::new(last, self.line_len(last) + 1);
        }
        let line = at.line.max(1);
        Position::new(line, at.column.clamp(1, self.line_len(line) + 1))
    }

    /// Inserts `text` at `at` and returns the position just after it.
    fn splice(&mut self, at: Position, text: &str) -> Position {
        let at = self.clamp(at);
        let split = self.byte_offset(at.line, at.column);
        let mut row = at.line - 1;
        let tail = self.lines[row].split_off(split);

        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next() {
            self.lines[row].push_str(first);
        }
        for piece in pieces {
            row += 1;
            self.lines.insert(row, piece.to_owned());
        }
        let end = Position::new(row + 1, self.lines[row].chars().count() + 1);
        self.lines[row].push_str(&tail);
        end
    }

    fn insert_at_cursor(&mut self, text: &str) {
        self.cursor = self.splice(self.cursor, text);
        self.after_edit();
    }

    fn move_to(&mut self, at: Position) {
        self.cursor = self.clamp(at);
        self.menu = None;
        self.scroll_to_cursor();
    }

    fn after_edit(&mut self) {
        self.revision += 1;
        self.menu = None;
        self.scroll_to_cursor();
    }

    fn scroll_to_cursor(&mut self) {
        let height = self.viewport_height.max(1);
        let row = self.cursor.line - 1;
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + height {
            self.scroll = row + 1 - height;
        }
        self.scroll = self.scroll.min(self.lines.len() - 1);
    }
}

impl EditorWidget for TextArea {
    fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn set_value(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_owned).collect();
        self.cursor = self.clamp(self.cursor);
        self.after_edit();
    }

    /// Inserts without disturbing the user's place: a cursor at or after the
    /// insertion point moves with the text it was on.
    fn insert_text(&mut self, at: Position, text: &str) {
        let at = self.clamp(at);
        let cursor = self.cursor;
        let end = self.splice(at, text);
        if (cursor.line, cursor.column) >= (at.line, at.column) {
            self.cursor = if cursor.line == at.line {
                Position::new(end.line, end.column + (cursor.column - at.column))
            } else {
                Position::new(cursor.line + (end.line - at.line), cursor.column)
            };
        }
        self.after_edit();
    }

    fn cursor(&self) -> Position {
        self.cursor
    }

    fn visible_ranges(&self) -> Vec<VisibleRange> {
        let start_line = self.scroll + 1;
        let end_line = (self.scroll + self.viewport_height.max(1)).min(self.lines.len());
        vec![VisibleRange { start_line, end_line: end_line.max(start_line) }]
    }

    fn set_language(&mut self, language: Language) {
        if self.language != language {
            self.language = language;
            self.revision += 1;
        }
    }

    fn set_markers(&mut self, owner: &str, markers: Vec<Marker>) {
        if markers.is_empty() {
            self.markers.remove(owner);
        } else {
            self.markers.insert(owner.to_owned(), markers);
        }
    }

    /// Opens the menu if the cursor is still where the request was made.
    /// Empty or outdated item lists close any open menu.
    fn show_completions(&mut self, anchor: Position, items: Vec<CompletionItem>) {
        self.menu = (!items.is_empty() && anchor == self.cursor).then_some(CompletionMenu {
            anchor,
            items,
            selected: 0,
        });
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_content(&self, line: usize) -> Option<String> {
        line.checked_sub(1).and_then(|i| self.lines.get(i)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_core::types::CompletionKind;
    use quill_core::MarkerSeverity;

    fn area(text: &str) -> TextArea {
        let mut area = TextArea::default();
        area.set_value(text);
        area
    }

    fn item(label: &str) -> CompletionItem {
        CompletionItem {
            label: label.to_owned(),
            kind: CompletionKind::Method,
            detail: String::new(),
            insert_text: format!("{label}()"),
        }
    }

    #[test]
    fn newline_carries_indentation() {
        let mut area = area("def f():\n    x = 1");
        area.move_bottom();
        area.move_end();
        area.insert_newline();
        area.insert_char('y');
        assert_eq!(area.text(), "def f():\n    x = 1\n    y");
        assert_eq!(area.cursor(), Position::new(3, 6));
    }

    #[test]
    fn backspace_and_delete_join_lines() {
        let mut area = area("ab\ncd");
        area.move_lines(1);
        area.backspace();
        assert_eq!(area.text(), "abcd");
        assert_eq!(area.cursor(), Position::new(1, 3));

        area.set_value("ab\ncd");
        area.move_top();
        area.move_end();
        area.delete();
        assert_eq!(area.text(), "abcd");
    }

    #[test]
    fn multibyte_characters_edit_by_column() {
        let mut area = area("héllo");
        area.move_right();
        area.move_right();
        area.backspace();
        assert_eq!(area.text(), "hllo");
        area.insert_char('é');
        assert_eq!(area.text(), "héllo");
        assert_eq!(area.cursor(), Position::new(1, 3));
    }

    #[test]
    fn insert_before_cursor_moves_cursor_along() {
        let mut area = area("# add\n\nprint(1)");
        area.move_lines(2);
        area.move_end();
        area.insert_text(Position::new(3, 1), "def add(a, b):\n    return a + b\n");
        assert_eq!(area.text(), "# add\n\ndef add(a, b):\n    return a + b\nprint(1)");
        assert_eq!(area.cursor(), Position::new(5, 9));
    }

    #[test]
    fn insert_past_end_appends() {
        let mut area = area("x");
        area.insert_text(Position::new(9, 1), "\ny");
        assert_eq!(area.text(), "x\ny");
    }

    #[test]
    fn completion_menu_accepts_selected_item() {
        let mut area = area("os.");
        area.move_end();
        area.show_completions(Position::new(1, 4), vec![item("getcwd"), item("listdir")]);
        area.menu_next();
        assert_eq!(area.menu().map(|m| m.selected), Some(1));
        assert!(area.accept_completion());
        assert_eq!(area.text(), "os.listdir()");
        assert_eq!(area.cursor(), Position::new(1, 13));
        assert!(area.menu().is_none());
        assert!(!area.accept_completion());
    }

    #[test]
    fn completions_for_old_cursor_are_not_shown() {
        let mut area = area("os.");
        area.show_completions(Position::new(1, 4), vec![item("getcwd")]);
        assert!(area.menu().is_none());
    }

    #[test]
    fn visible_range_follows_cursor() {
        let text = (1..=50).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let mut area = area(&text);
        area.set_viewport_height(10);
        assert_eq!(area.visible_ranges(), vec![VisibleRange { start_line: 1, end_line: 10 }]);
        area.move_lines(14);
        assert_eq!(area.visible_ranges(), vec![VisibleRange { start_line: 6, end_line: 15 }]);
    }

    #[test]
    fn markers_are_replaced_per_owner() {
        let mut area = area("a\nb");
        let marker = Marker {
            severity: MarkerSeverity::Warning,
            start_line: 2,
            start_column: 1,
            end_line: 2,
            end_column: 2,
            message: "m".into(),
        };
        area.set_markers("code-review", vec![marker.clone()]);
        area.set_markers("other", vec![marker]);
        assert_eq!(area.markers_on_line(2).count(), 2);
        area.set_markers("code-review", Vec::new());
        assert_eq!(area.markers_on_line(2).count(), 1);
        assert_eq!(area.markers_on_line(1).count(), 0);
    }
}
