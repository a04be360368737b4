//! Comment-to-code trigger.
//!
//! When Enter commits line N-1 and moves the cursor to line N, a committed
//! line that starts with the comment marker becomes a generation request. The
//! per-buffer `generation_in_flight` flag makes the detector a two-state
//! machine, `idle ⇄ generating`, with no queueing.

use crate::types::Position;
use crate::window::comment_context;
use crate::wire::GenerateRequest;

/// Marker character that makes a committed line a generation prompt.
pub const COMMENT_MARKER: char = '#';

/// A generation request plus what the session needs to place its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentTrigger {
    /// 1-based line holding the comment.
    pub comment_line: usize,
    /// The comment line exactly as it was committed.
    pub line_text: String,
    pub request: GenerateRequest,
}

/// Extracts the prompt from a committed line, or `None` if it is not a comment.
///
/// The line is trimmed, must start with [`COMMENT_MARKER`], and the marker
/// plus surrounding whitespace are stripped from the result.
pub fn extract_comment(line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix(COMMENT_MARKER)?;
    Some(rest.trim().to_owned())
}

/// Inspects the line committed by an Enter that left the cursor on `cursor_line`.
///
/// Returns `None` when the cursor is on the first line (nothing was committed)
/// or the committed line is not a comment.
pub fn detect(text: &str, cursor_line: usize) -> Option<CommentTrigger> {
    let comment_line = cursor_line.checked_sub(1).filter(|l| *l >= 1)?;
    let line_text = text.split('\n').nth(comment_line - 1)?.to_owned();
    let comment = extract_comment(&line_text)?;
    Some(CommentTrigger {
        comment_line,
        request: GenerateRequest {
            comment,
            context: comment_context(text, comment_line),
        },
        line_text,
    })
}

/// Where generated code goes: column 1 of the line two below the comment,
/// leaving the blank line made by the Enter press in place above it.
pub fn insertion_point(comment_line: usize) -> Position {
    Position::new(comment_line + 2, 1)
}
