//! Debounced completion requests.
//!
//! The widget's completion provider calls [`SuggestionPipeline::trigger`] on
//! every trigger character. Only the last trigger of a burst survives the
//! quiet period; its cursor state becomes the request.

use std::time::Duration;

use crate::debounce::Debouncer;
use crate::types::{Language, Position, VisibleRange};
use crate::window::completion_window;
use crate::wire::AutocompleteRequest;

/// Characters that open a completion session in the widget. Newline included.
pub const TRIGGER_CHARACTERS: [char; 8] = ['.', ' ', '\n', '\'', '"', '[', '(', '{'];

/// The cursor state captured by the latest trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSuggestion {
    pub generation: u64,
    pub buffer_id: String,
    pub anchor: Position,
}

#[derive(Debug)]
pub struct SuggestionPipeline {
    debouncer: Debouncer,
    pending: Option<PendingSuggestion>,
}

impl SuggestionPipeline {
    pub fn new(quiet: Duration) -> Self {
        Self { debouncer: Debouncer::new(quiet), pending: None }
    }

    /// Records a trigger at `anchor` and restarts the quiet period.
    ///
    /// `on_due` is called with the generation once the period elapses.
    pub fn trigger<F>(&mut self, buffer_id: &str, anchor: Position, on_due: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let generation = self.debouncer.trigger(on_due);
        self.pending = Some(PendingSuggestion {
            generation,
            buffer_id: buffer_id.to_owned(),
            anchor,
        });
        generation
    }

    /// Claims the pending trigger if `generation` is still the latest.
    ///
    /// A stale timer firing returns `None` and leaves the newer trigger in place.
    pub fn take_due(&mut self, generation: u64) -> Option<PendingSuggestion> {
        if !self.debouncer.is_current(generation) {
            return None;
        }
        self.pending.take().filter(|p| p.generation == generation)
    }

    /// `true` if a response for `generation` may still be shown.
    pub fn is_current(&self, generation: u64) -> bool {
        self.debouncer.is_current(generation)
    }

    /// Abandons any pending trigger and fences off in-flight responses.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.debouncer.cancel();
    }
}

/// Builds the windowed request for a cursor at `anchor` in `full_text`.
pub fn build_request(
    full_text: &str,
    anchor: Position,
    language: Language,
    visible_ranges: Vec<VisibleRange>,
) -> AutocompleteRequest {
    let window = completion_window(full_text, anchor.line);
    AutocompleteRequest {
        source: window.text,
        full_source: full_text.to_owned(),
        line: window.remapped_cursor_line,
        column: anchor.column,
        language,
        visible_ranges,
    }
}
