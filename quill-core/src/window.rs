//! Bounded text windows around a cursor line.
//!
//! Lines are 1-based and split on `\n`, so a buffer ending in a newline has a
//! trailing empty line, as the widget reports it.

/// Lines either side of the cursor sent with a completion request.
pub const COMPLETION_RADIUS: usize = 20;

/// Lines either side of a committed comment sent with a generation request.
pub const COMMENT_CONTEXT_RADIUS: usize = 5;

/// A slice of a buffer around a cursor, with the cursor remapped into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    pub start_line: usize,
    pub end_line: usize,
    pub text: String,
    pub remapped_cursor_line: usize,
}

/// Number of lines in `text` as the widget counts them (never zero).
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Inclusive `[start, end]` line bounds of a `radius` window around `line`.
///
/// `line` is clamped into `1..=total_lines` first so the result always
/// satisfies `1 <= start <= end <= total_lines`.
pub fn bounds(line: usize, total_lines: usize, radius: usize) -> (usize, usize) {
    let total = total_lines.max(1);
    let line = line.clamp(1, total);
    let start = line.saturating_sub(radius).max(1);
    let end = (line + radius).min(total);
    (start, end)
}

/// Computes the completion window around `cursor_line`.
///
/// The window spans `max(1, cursor - 20)..=min(total, cursor + 20)` at full
/// line width, and the cursor line is remapped to its 1-based offset inside it.
pub fn completion_window(text: &str, cursor_line: usize) -> ContextWindow {
    let total = line_count(text);
    let (start_line, end_line) = bounds(cursor_line, total, COMPLETION_RADIUS);
    let cursor = cursor_line.clamp(1, total);
    ContextWindow {
        start_line,
        end_line,
        text: slice_lines(text, start_line, end_line),
        remapped_cursor_line: cursor - start_line + 1,
    }
}

/// Builds the ±5-line context sent with a comment-generation request.
///
/// Every line in the window is followed by a newline, including the last.
pub fn comment_context(text: &str, comment_line: usize) -> String {
    let total = line_count(text);
    let (start, end) = bounds(comment_line, total, COMMENT_CONTEXT_RADIUS);
    let mut context = slice_lines(text, start, end);
    context.push('\n');
    context
}

fn slice_lines(text: &str, start: usize, end: usize) -> String {
    text.split('\n')
        .skip(start - 1)
        .take(end + 1 - start)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn small_file_window_covers_everything() {
        let w = completion_window(&numbered(5), 3);
        assert_eq!((w.start_line, w.end_line), (1, 5));
        assert_eq!(w.remapped_cursor_line, 3);
        assert_eq!(w.text, numbered(5));
    }

    #[test]
    fn large_file_window_is_forty_one_lines() {
        let w = completion_window(&numbered(100), 50);
        assert_eq!((w.start_line, w.end_line), (30, 70));
        assert_eq!(w.remapped_cursor_line, 21);
        assert!(w.text.starts_with("line 30\n"));
        assert!(w.text.ends_with("line 70"));
    }

    #[test]
    fn bounds_hold_for_every_cursor_and_length() {
        for total in 1..=60 {
            let text = numbered(total);
            for cursor in 1..=total {
                let w = completion_window(&text, cursor);
                assert!(w.start_line >= 1);
                assert!(w.end_line <= total);
                assert!(w.end_line >= w.start_line);
                assert_eq!(w.start_line + w.remapped_cursor_line - 1, cursor);
                let cursor_text = w.text.split('\n').nth(w.remapped_cursor_line - 1);
                assert_eq!(cursor_text, Some(format!("line {cursor}").as_str()));
            }
        }
    }

    #[test]
    fn out_of_range_cursor_is_clamped() {
        let w = completion_window("a\nb", 9);
        assert_eq!((w.start_line, w.end_line, w.remapped_cursor_line), (1, 2, 2));
    }

    #[test]
    fn comment_context_ends_each_line_with_newline() {
        let text = numbered(20);
        let ctx = comment_context(&text, 10);
        assert!(ctx.starts_with("line 5\n"));
        assert!(ctx.ends_with("line 15\n"));
        assert_eq!(ctx.lines().count(), 11);
    }
}
