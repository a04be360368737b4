//! Shared fakes for session tests: an in-memory widget and a scripted service.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quill_core::types::{
    CompletionItem, CompletionKind, ExecutionResult, Language, Position, ReviewReport,
    VisibleRange,
};
use quill_core::widget::{EditorWidget, Marker};
use quill_core::wire::{AutocompleteRequest, CodeRequest, GenerateRequest};
use quill_core::{AssistService, BufferStore, ServiceError, Session, SessionConfig, SessionEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Line-vector widget with just enough behavior to observe the core.
#[derive(Debug)]
pub struct FakeWidget {
    pub lines: Vec<String>,
    pub cursor: Position,
    pub language: Option<Language>,
    pub markers: HashMap<String, Vec<Marker>>,
    pub completions: Vec<(Position, Vec<CompletionItem>)>,
}

impl Default for FakeWidget {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: Position::new(1, 1),
            language: None,
            markers: HashMap::new(),
            completions: Vec::new(),
        }
    }
}

impl FakeWidget {
    pub fn with_text(text: &str, cursor: Position) -> Self {
        let mut widget = FakeWidget::default();
        widget.set_value(text);
        widget.cursor = cursor;
        widget
    }

    pub fn review_markers(&self) -> &[Marker] {
        self.markers.get("code-review").map(Vec::as_slice).unwrap_or(&[])
    }
}

impl EditorWidget for FakeWidget {
    fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn set_value(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_owned).collect();
    }

    fn insert_text(&mut self, at: Position, text: &str) {
        let last = self.lines.len();
        let (line, column) = if at.line > last {
            (last, self.lines[last - 1].chars().count() + 1)
        } else {
            (at.line.max(1), at.column.max(1))
        };
        let current = &self.lines[line - 1];
        let split = current
            .char_indices()
            .nth(column - 1)
            .map_or(current.len(), |(i, _)| i);
        let joined = format!("{}{}{}", &current[..split], text, &current[split..]);
        let replacement: Vec<String> = joined.split('\n').map(str::to_owned).collect();
        self.lines.splice(line - 1..line, replacement);
    }

    fn cursor(&self) -> Position {
        self.cursor
    }

    fn visible_ranges(&self) -> Vec<VisibleRange> {
        vec![VisibleRange { start_line: 1, end_line: self.lines.len() }]
    }

    fn set_language(&mut self, language: Language) {
        self.language = Some(language);
    }

    fn set_markers(&mut self, owner: &str, markers: Vec<Marker>) {
        self.markers.insert(owner.to_owned(), markers);
    }

    fn show_completions(&mut self, anchor: Position, items: Vec<CompletionItem>) {
        self.completions.push((anchor, items));
    }
}

/// Scripted [`AssistService`] that records every request it receives.
#[derive(Default)]
pub struct FakeService {
    pub available: bool,
    pub completions: Mutex<Vec<CompletionItem>>,
    pub generated: Mutex<Option<String>>,
    pub review: Mutex<Option<ReviewReport>>,
    pub execution: Mutex<Option<ExecutionResult>>,
    pub autocomplete_requests: Mutex<Vec<AutocompleteRequest>>,
    pub generate_requests: Mutex<Vec<GenerateRequest>>,
    pub review_requests: Mutex<Vec<CodeRequest>>,
    pub execute_requests: Mutex<Vec<CodeRequest>>,
}

impl FakeService {
    pub fn completion(label: &str) -> CompletionItem {
        CompletionItem {
            label: label.to_owned(),
            kind: CompletionKind::Function,
            detail: String::new(),
            insert_text: label.to_owned(),
        }
    }
}

fn unavailable<T>(scripted: Option<T>) -> Result<T, ServiceError> {
    scripted.ok_or(ServiceError::Status(503))
}

#[async_trait]
impl AssistService for FakeService {
    async fn status(&self) -> Result<(), ServiceError> {
        if self.available {
            Ok(())
        } else {
            Err(ServiceError::Status(503))
        }
    }

    async fn autocomplete(
        &self,
        request: AutocompleteRequest,
    ) -> Result<Vec<CompletionItem>, ServiceError> {
        self.autocomplete_requests.lock().unwrap().push(request);
        Ok(self.completions.lock().unwrap().clone())
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, ServiceError> {
        self.generate_requests.lock().unwrap().push(request);
        unavailable(self.generated.lock().unwrap().clone())
    }

    async fn review(&self, request: CodeRequest) -> Result<ReviewReport, ServiceError> {
        self.review_requests.lock().unwrap().push(request);
        unavailable(self.review.lock().unwrap().clone())
    }

    async fn execute(&self, request: CodeRequest) -> Result<ExecutionResult, ServiceError> {
        self.execute_requests.lock().unwrap().push(request);
        unavailable(self.execution.lock().unwrap().clone())
    }
}

/// A session over one mounted [`FakeWidget`], plus its event receiver.
pub struct Harness {
    pub session: Session<FakeWidget>,
    pub events: UnboundedReceiver<SessionEvent>,
    pub service: Arc<FakeService>,
    pub buffer_id: String,
}

impl Harness {
    pub fn new(service: FakeService, text: &str, cursor: Position) -> Self {
        let service = Arc::new(service);
        let (tx, events) = mpsc::unbounded_channel();
        let mut session = Session::new(
            BufferStore::default(),
            service.clone(),
            tx,
            SessionConfig::default(),
        );
        let buffer_id = session.store().active_id().to_owned();
        session.on_mount(&buffer_id, FakeWidget::default());
        let widget = session.widget_mut(&buffer_id).unwrap();
        widget.set_value(text);
        widget.cursor = cursor;
        session.on_text_changed(&buffer_id);
        Self { session, events, service, buffer_id }
    }

    pub fn widget(&self) -> &FakeWidget {
        self.session.widget(&self.buffer_id).unwrap()
    }

    pub fn widget_mut(&mut self) -> &mut FakeWidget {
        self.session.widget_mut(&self.buffer_id).unwrap()
    }

    /// Receives one background result and reconciles it.
    pub async fn pump(&mut self) {
        let event = self.events.recv().await.expect("session event channel closed");
        self.session.handle_event(event);
    }
}
