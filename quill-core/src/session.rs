//! The editor session controller.
//!
//! [`Session`] owns the buffer store, the mounted widgets, and every
//! AI-assisted workflow. It is driven from a single task: widget callbacks and
//! user actions call its methods directly, network round-trips run on spawned
//! tasks, and their results come back as [`SessionEvent`]s which the same
//! task feeds to [`Session::handle_event`]. All state mutation therefore
//! happens in one place, between awaits, never concurrently.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::buffers::BufferStore;
use crate::client::AssistService;
use crate::comment;
use crate::debounce::DEFAULT_QUIET_PERIOD;
use crate::error::ServiceError;
use crate::execution::ExecutionOrchestrator;
use crate::persist::PersistHandle;
use crate::review::{project_markers, ReviewOrchestrator};
use crate::suggest::{build_request, SuggestionPipeline};
use crate::types::{
    Buffer, CompletionItem, ExecutionResult, Language, Position, ReviewReport,
};
use crate::widget::{EditorWidget, WidgetRegistry, REVIEW_MARKER_OWNER};
use crate::wire::CodeRequest;

/// Tunables for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Quiet period before a completion request fires.
    pub debounce: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { debounce: DEFAULT_QUIET_PERIOD }
    }
}

/// Results of background work, delivered back to the controlling task.
#[derive(Debug)]
#[non_exhaustive]
pub enum SessionEvent {
    /// A completion quiet period elapsed.
    SuggestionDue { generation: u64 },
    /// Completion items (empty on failure) for the request of `generation`.
    Completions {
        generation: u64,
        buffer_id: String,
        anchor: Position,
        items: Vec<CompletionItem>,
    },
    /// A comment-generation request finished.
    Generated {
        buffer_id: String,
        comment_line: usize,
        line_text: String,
        outcome: Result<String, ServiceError>,
    },
    /// A review request finished.
    Reviewed {
        buffer_id: String,
        outcome: Result<ReviewReport, ServiceError>,
    },
    /// A compile/execute request finished.
    Executed {
        outcome: Result<ExecutionResult, ServiceError>,
    },
    /// The status probe finished.
    Status { available: bool },
}

pub struct Session<W> {
    store: BufferStore,
    widgets: WidgetRegistry<W>,
    service: Arc<dyn AssistService>,
    events: UnboundedSender<SessionEvent>,
    suggestions: SuggestionPipeline,
    review: ReviewOrchestrator,
    execution: ExecutionOrchestrator,
    persist: Option<PersistHandle>,
    backend_available: Option<bool>,
}

impl<W: EditorWidget> Session<W> {
    /// Creates a session over `store`. Background results are sent on `events`.
    pub fn new(
        store: BufferStore,
        service: Arc<dyn AssistService>,
        events: UnboundedSender<SessionEvent>,
        config: SessionConfig,
    ) -> Self {
        Self {
            store,
            widgets: WidgetRegistry::default(),
            service,
            events,
            suggestions: SuggestionPipeline::new(config.debounce),
            review: ReviewOrchestrator::default(),
            execution: ExecutionOrchestrator::default(),
            persist: None,
            backend_available: None,
        }
    }

    /// Persists the store through `handle` after every mutation.
    pub fn with_persistence(mut self, handle: PersistHandle) -> Self {
        self.persist = Some(handle);
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn store(&self) -> &BufferStore {
        &self.store
    }

    pub fn widget(&self, buffer_id: &str) -> Option<&W> {
        self.widgets.get(buffer_id)
    }

    /// Mutable widget access for the front end's own editing.
    ///
    /// Edits made this way must be followed by [`Session::on_text_changed`].
    pub fn widget_mut(&mut self, buffer_id: &str) -> Option<&mut W> {
        self.widgets.get_mut(buffer_id)
    }

    pub fn active_buffer(&self) -> &Buffer {
        self.store.active()
    }

    pub fn review_report(&self) -> Option<&ReviewReport> {
        self.review.report()
    }

    /// Buffer the current review report was produced for.
    pub fn review_buffer_id(&self) -> Option<&str> {
        self.review.buffer_id()
    }

    pub fn review_in_flight(&self) -> bool {
        self.review.in_flight()
    }

    pub fn execution_result(&self) -> Option<&ExecutionResult> {
        self.execution.result()
    }

    pub fn execution_in_flight(&self) -> bool {
        self.execution.in_flight()
    }

    /// `None` until the status probe has answered.
    pub fn backend_available(&self) -> Option<bool> {
        self.backend_available
    }

    /// Waits for every queued store snapshot to reach disk.
    pub async fn flush(&self) {
        if let Some(handle) = &self.persist {
            if let Err(e) = handle.flush().await {
                warn!(error = %e, "could not flush editor state");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Widget subscription points
    // -----------------------------------------------------------------------

    /// Registers a freshly mounted widget for `buffer_id` and loads the
    /// buffer's text and language into it.
    ///
    /// Returns `false` (and drops the widget) if the buffer does not exist.
    pub fn on_mount(&mut self, buffer_id: &str, mut widget: W) -> bool {
        let Some(buffer) = self.store.get(buffer_id) else {
            warn!(buffer_id, "widget mounted for unknown buffer");
            return false;
        };
        if widget.text() != buffer.text {
            widget.set_value(&buffer.text);
        }
        widget.set_language(buffer.language);
        self.widgets.mount(buffer_id, widget);
        true
    }

    /// Copies the widget's text into the store after a user edit.
    pub fn on_text_changed(&mut self, buffer_id: &str) {
        let Some(text) = self.widgets.get(buffer_id).map(|w| w.text()) else {
            return;
        };
        if self.store.update_text(buffer_id, &text) {
            self.persist();
        }
    }

    /// Completion-provider invocation: restarts the quiet period at the
    /// widget's current cursor.
    pub fn on_completion_requested(&mut self, buffer_id: &str) {
        let Some(anchor) = self.widgets.get(buffer_id).map(|w| w.cursor()) else {
            return;
        };
        let events = self.events.clone();
        self.suggestions.trigger(buffer_id, anchor, move |generation| {
            let _ = events.send(SessionEvent::SuggestionDue { generation });
        });
    }

    /// Line-commit (Enter) hook: starts comment generation when the committed
    /// line is a comment and the buffer is idle.
    ///
    /// Returns `true` when a generation request was issued.
    pub fn on_key_commit(&mut self, buffer_id: &str) -> bool {
        match self.store.get(buffer_id) {
            Some(buffer) if !buffer.generation_in_flight => {}
            _ => return false,
        }
        let Some(widget) = self.widgets.get(buffer_id) else {
            return false;
        };
        let Some(trigger) = comment::detect(&widget.text(), widget.cursor().line) else {
            return false;
        };

        self.store.set_generation_in_flight(buffer_id, true);
        debug!(buffer_id, line = trigger.comment_line, "requesting code for comment");

        let service = Arc::clone(&self.service);
        let events = self.events.clone();
        let buffer_id = buffer_id.to_owned();
        tokio::spawn(async move {
            let outcome = service.generate(trigger.request).await;
            let _ = events.send(SessionEvent::Generated {
                buffer_id,
                comment_line: trigger.comment_line,
                line_text: trigger.line_text,
                outcome,
            });
        });
        true
    }

    // -----------------------------------------------------------------------
    // User actions
    // -----------------------------------------------------------------------

    /// Creates a buffer in the selected language, makes it active, and
    /// returns its id. The caller mounts a widget for it.
    pub fn create_buffer(&mut self) -> String {
        let language = self.store.selected_language();
        let id = self.store.create_buffer(language).id.clone();
        info!(buffer_id = %id, %language, "created buffer");
        self.persist();
        id
    }

    /// Switches the active buffer. Unknown ids are ignored.
    ///
    /// A pending completion for the previous buffer is abandoned.
    pub fn set_active(&mut self, buffer_id: &str) {
        if self.store.set_active(buffer_id) {
            self.suggestions.cancel();
            self.persist();
        }
    }

    /// Changes the active buffer's language and the selected language.
    pub fn set_language(&mut self, language: Language) {
        self.store.set_language(language);
        let active = self.store.active_id().to_owned();
        if let Some(widget) = self.widgets.get_mut(&active) {
            widget.set_language(language);
        }
        self.persist();
    }

    /// Sends the active buffer for review. A no-op while a review is out.
    ///
    /// Returns `true` when a request was issued.
    pub fn request_review(&mut self) -> bool {
        if !self.review.begin() {
            debug!("review already in flight");
            return false;
        }
        let buffer = self.store.active();
        let buffer_id = buffer.id.clone();
        let request = CodeRequest { code: buffer.text.clone(), language: buffer.language };

        let service = Arc::clone(&self.service);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = service.review(request).await;
            let _ = events.send(SessionEvent::Reviewed { buffer_id, outcome });
        });
        true
    }

    /// Replaces the reviewed buffer with the corrected text and dismisses the
    /// review panel. Markers stay until the panel is closed or a new review lands.
    ///
    /// Returns `false` when there was nothing to apply.
    pub fn apply_corrections(&mut self) -> bool {
        let Some((buffer_id, corrected)) = self.review.take_corrections() else {
            return false;
        };
        self.commit_edit(&buffer_id, |widget| widget.set_value(&corrected));
        true
    }

    /// Dismisses the review panel and clears its markers.
    pub fn close_review(&mut self) {
        if let Some(buffer_id) = self.review.close() {
            if let Some(widget) = self.widgets.get_mut(&buffer_id) {
                widget.set_markers(REVIEW_MARKER_OWNER, Vec::new());
            }
        }
    }

    /// Sends the active buffer for execution. A no-op while a run is out.
    ///
    /// Returns `true` when a request was issued.
    pub fn run_active(&mut self) -> bool {
        if !self.execution.begin() {
            debug!("execution already in flight");
            return false;
        }
        let buffer = self.store.active();
        let request = CodeRequest { code: buffer.text.clone(), language: buffer.language };

        let service = Arc::clone(&self.service);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = service.execute(request).await;
            let _ = events.send(SessionEvent::Executed { outcome });
        });
        true
    }

    pub fn dismiss_output(&mut self) {
        self.execution.dismiss();
    }

    /// Probes service availability in the background.
    pub fn check_status(&self) {
        let service = Arc::clone(&self.service);
        let events = self.events.clone();
        tokio::spawn(async move {
            let available = match service.status().await {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "assist service unavailable");
                    false
                }
            };
            let _ = events.send(SessionEvent::Status { available });
        });
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    /// Applies the result of background work to session state.
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SuggestionDue { generation } => self.fire_suggestion(generation),
            SessionEvent::Completions { generation, buffer_id, anchor, items } => {
                if !self.suggestions.is_current(generation) {
                    debug!(generation, "discarding stale completions");
                    return;
                }
                if let Some(widget) = self.widgets.get_mut(&buffer_id) {
                    widget.show_completions(anchor, items);
                }
            }
            SessionEvent::Generated { buffer_id, comment_line, line_text, outcome } => {
                self.finish_generation(&buffer_id, comment_line, &line_text, outcome);
            }
            SessionEvent::Reviewed { buffer_id, outcome } => {
                self.finish_review(&buffer_id, outcome);
            }
            SessionEvent::Executed { outcome } => {
                if let Err(e) = &outcome {
                    warn!(error = %e, "execution failed");
                }
                self.execution.complete(outcome);
            }
            SessionEvent::Status { available } => {
                info!(available, "assist service status");
                self.backend_available = Some(available);
            }
        }
    }

    fn fire_suggestion(&mut self, generation: u64) {
        let Some(pending) = self.suggestions.take_due(generation) else {
            return;
        };
        let (Some(buffer), Some(widget)) = (
            self.store.get(&pending.buffer_id),
            self.widgets.get(&pending.buffer_id),
        ) else {
            return;
        };
        let request = build_request(
            &buffer.text,
            pending.anchor,
            buffer.language,
            widget.visible_ranges(),
        );

        let service = Arc::clone(&self.service);
        let events = self.events.clone();
        tokio::spawn(async move {
            let items = match service.autocomplete(request).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(error = %e, "autocomplete request failed");
                    Vec::new()
                }
            };
            let _ = events.send(SessionEvent::Completions {
                generation,
                buffer_id: pending.buffer_id,
                anchor: pending.anchor,
                items,
            });
        });
    }

    fn finish_generation(
        &mut self,
        buffer_id: &str,
        comment_line: usize,
        line_text: &str,
        outcome: Result<String, ServiceError>,
    ) {
        self.store.set_generation_in_flight(buffer_id, false);

        let code = match outcome {
            Ok(code) if !code.is_empty() => code,
            Ok(_) => {
                debug!(buffer_id, "service generated nothing");
                return;
            }
            Err(e) => {
                warn!(buffer_id, error = %e, "code generation failed");
                return;
            }
        };

        let unchanged = self
            .widgets
            .get(buffer_id)
            .and_then(|w| w.line_content(comment_line))
            .is_some_and(|line| line == line_text);
        if !unchanged {
            warn!(buffer_id, comment_line, "comment line changed during generation; dropping code");
            return;
        }

        let at = comment::insertion_point(comment_line);
        self.commit_edit(buffer_id, |widget| widget.insert_text(at, &format!("{code}\n")));
    }

    fn finish_review(&mut self, buffer_id: &str, outcome: Result<ReviewReport, ServiceError>) {
        let report = match outcome {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "review failed");
                self.review.complete(buffer_id, None);
                return;
            }
        };

        // A new review replaces the previous marker set wherever it was.
        if let Some(previous) = self.review.buffer_id().filter(|id| *id != buffer_id) {
            if let Some(widget) = self.widgets.get_mut(previous) {
                widget.set_markers(REVIEW_MARKER_OWNER, Vec::new());
            }
        }
        if let Some(widget) = self.widgets.get_mut(buffer_id) {
            let markers = project_markers(&*widget, &report.diagnostics);
            widget.set_markers(REVIEW_MARKER_OWNER, markers);
        }
        info!(buffer_id, issues = report.diagnostics.len(), "review received");
        self.review.complete(buffer_id, Some(report));
    }

    /// The single path by which the core edits a widget: apply `edit`, then
    /// write the widget's text back into the store and persist.
    fn commit_edit<F>(&mut self, buffer_id: &str, edit: F)
    where
        F: FnOnce(&mut W),
    {
        let Some(widget) = self.widgets.get_mut(buffer_id) else {
            warn!(buffer_id, "edit for unmounted buffer dropped");
            return;
        };
        edit(widget);
        let text = widget.text();
        if self.store.update_text(buffer_id, &text) {
            self.persist();
        }
    }

    fn persist(&self) {
        if let Some(handle) = &self.persist {
            handle.save(self.store.snapshot());
        }
    }
}
