//! End-to-end session behavior against an in-memory widget and a scripted service.

use std::time::Duration;

use pretty_assertions::assert_eq;
use quill_core::types::{Diagnostic, ExecutionResult, Language, Position, ReviewReport, Severity};
use quill_core::{EditorWidget, MarkerSeverity};

mod common;
use common::{FakeService, FakeWidget, Harness};

const REVIEWED: &str = "a = 1\nb = 2\nc = 3\nunused = 4\nprint(a)";

fn review_with_issue_on_line_4() -> ReviewReport {
    ReviewReport {
        diagnostics: vec![Diagnostic {
            severity: Severity::Error,
            line: 4,
            message: "unused variable".into(),
            suggestion: "remove `unused`".into(),
        }],
        corrected_text: Some("a = 1\nprint(a)\n".into()),
        summary: "One unused variable.".into(),
    }
}

fn reviewing_service() -> FakeService {
    let service = FakeService::default();
    *service.review.lock().unwrap() = Some(review_with_issue_on_line_4());
    service
}

// ---------------------------------------------------------------------------
// Completions
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn burst_of_triggers_sends_one_request_with_last_cursor() {
    let service = FakeService::default();
    *service.completions.lock().unwrap() = vec![FakeService::completion("path")];
    let mut h = Harness::new(service, "import os\nos.\n", Position::new(2, 1));
    let id = h.buffer_id.clone();

    for column in 1..=4 {
        h.widget_mut().cursor = Position::new(2, column);
        h.session.on_completion_requested(&id);
        tokio::time::advance(Duration::from_millis(500)).await;
    }
    h.pump().await;
    h.pump().await;

    let requests = h.service.autocomplete_requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].line, 2);
    assert_eq!(requests[0].column, 4);
    assert_eq!(requests[0].language, Language::Python);
    assert_eq!(requests[0].full_source, "import os\nos.\n");
    assert_eq!(
        h.widget().completions,
        vec![(Position::new(2, 4), vec![FakeService::completion("path")])]
    );
}

#[tokio::test(start_paused = true)]
async fn completions_for_a_superseded_trigger_are_dropped() {
    let service = FakeService::default();
    *service.completions.lock().unwrap() = vec![FakeService::completion("len")];
    let mut h = Harness::new(service, "x = \n", Position::new(1, 5));
    let id = h.buffer_id.clone();

    h.session.on_completion_requested(&id);
    h.pump().await; // quiet period over, request sent

    h.widget_mut().cursor = Position::new(1, 4);
    h.session.on_completion_requested(&id);
    h.pump().await; // first response lands after the new trigger
    assert!(h.widget().completions.is_empty());

    h.pump().await;
    h.pump().await;
    assert_eq!(h.service.autocomplete_requests.lock().unwrap().len(), 2);
    assert_eq!(h.widget().completions.len(), 1);
    assert_eq!(h.widget().completions[0].0, Position::new(1, 4));
}

#[tokio::test(start_paused = true)]
async fn switching_buffers_abandons_pending_completion() {
    let service = FakeService::default();
    *service.completions.lock().unwrap() = vec![FakeService::completion("path")];
    let mut h = Harness::new(service, "os.", Position::new(1, 4));
    let first = h.buffer_id.clone();
    let second = h.session.create_buffer();
    assert!(h.session.on_mount(&second, FakeWidget::default()));
    h.session.set_active(&first);

    h.session.on_completion_requested(&first);
    h.session.set_active(&second);
    tokio::time::advance(Duration::from_secs(5)).await;
    tokio::task::yield_now().await;
    while let Ok(event) = h.events.try_recv() {
        h.session.handle_event(event);
    }
    tokio::task::yield_now().await;
    while let Ok(event) = h.events.try_recv() {
        h.session.handle_event(event);
    }

    assert!(h.service.autocomplete_requests.lock().unwrap().is_empty());
    assert!(h.session.widget(&first).unwrap().completions.is_empty());
}

// ---------------------------------------------------------------------------
// Comment-to-code
// ---------------------------------------------------------------------------

fn generating_service() -> FakeService {
    let service = FakeService::default();
    *service.generated.lock().unwrap() = Some("def add(a, b):\n    return a + b".into());
    service
}

#[tokio::test]
async fn comment_line_generates_code_two_lines_below() {
    let mut h = Harness::new(
        generating_service(),
        "# add two numbers\n\nprint(1)",
        Position::new(2, 1),
    );
    let id = h.buffer_id.clone();

    assert!(h.session.on_key_commit(&id));
    assert!(h.session.store().get(&id).unwrap().generation_in_flight);
    assert!(!h.session.on_key_commit(&id), "second commit while generating");
    h.pump().await;

    let expected = "# add two numbers\n\ndef add(a, b):\n    return a + b\nprint(1)";
    assert_eq!(h.widget().text(), expected);
    assert_eq!(h.session.store().get(&id).unwrap().text, expected);
    assert!(!h.session.store().get(&id).unwrap().generation_in_flight);

    let requests = h.service.generate_requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].comment, "add two numbers");
    assert!(requests[0].context.starts_with("# add two numbers\n"));
}

#[tokio::test]
async fn code_line_does_not_trigger_generation() {
    let mut h = Harness::new(generating_service(), "x = 1\n", Position::new(2, 1));
    let id = h.buffer_id.clone();

    assert!(!h.session.on_key_commit(&id));
    assert!(h.service.generate_requests.lock().unwrap().is_empty());
    assert!(!h.session.store().get(&id).unwrap().generation_in_flight);
}

#[tokio::test]
async fn edited_comment_line_discards_generated_code() {
    let mut h = Harness::new(
        generating_service(),
        "# add two numbers\n\nprint(1)",
        Position::new(2, 1),
    );
    let id = h.buffer_id.clone();

    assert!(h.session.on_key_commit(&id));
    h.widget_mut().set_value("# add three numbers\n\nprint(1)");
    h.session.on_text_changed(&id);
    h.pump().await;

    assert_eq!(h.widget().text(), "# add three numbers\n\nprint(1)");
    assert!(!h.session.store().get(&id).unwrap().generation_in_flight);
    assert!(h.session.on_key_commit(&id), "detector is idle again");
}

#[tokio::test]
async fn failed_generation_leaves_text_and_resets_flag() {
    let mut h = Harness::new(FakeService::default(), "# sort a list\n", Position::new(2, 1));
    let id = h.buffer_id.clone();

    assert!(h.session.on_key_commit(&id));
    h.pump().await;

    assert_eq!(h.widget().text(), "# sort a list\n");
    assert!(!h.session.store().get(&id).unwrap().generation_in_flight);
}

#[tokio::test]
async fn empty_generated_code_inserts_nothing() {
    let service = FakeService::default();
    *service.generated.lock().unwrap() = Some(String::new());
    let mut h = Harness::new(service, "# add two numbers\n\nprint(1)", Position::new(2, 1));
    let id = h.buffer_id.clone();

    assert!(h.session.on_key_commit(&id));
    h.pump().await;

    assert_eq!(h.widget().text(), "# add two numbers\n\nprint(1)");
    assert_eq!(h.session.store().get(&id).unwrap().text, "# add two numbers\n\nprint(1)");
    assert!(!h.session.store().get(&id).unwrap().generation_in_flight);
    assert_eq!(h.service.generate_requests.lock().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

#[tokio::test]
async fn review_places_one_marker_per_diagnostic() {
    let mut h = Harness::new(reviewing_service(), REVIEWED, Position::new(1, 1));

    assert!(h.session.request_review());
    assert!(!h.session.request_review(), "review is single-flight");
    assert!(h.session.review_in_flight());
    h.pump().await;

    assert!(!h.session.review_in_flight());
    let requests = h.service.review_requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].code, REVIEWED);
    assert_eq!(requests[0].language, Language::Python);

    let markers = h.widget().review_markers();
    assert_eq!(markers.len(), 1);
    let marker = &markers[0];
    assert_eq!(marker.severity, MarkerSeverity::Error);
    assert_eq!((marker.start_line, marker.end_line), (4, 4));
    assert_eq!((marker.start_column, marker.end_column), (1, "unused = 4".len() + 1));
    assert!(marker.message.contains("unused variable"));
    assert!(marker.message.contains("remove `unused`"));
    assert_eq!(h.session.review_report(), Some(&review_with_issue_on_line_4()));
}

#[tokio::test]
async fn applying_corrections_is_idempotent() {
    let mut h = Harness::new(reviewing_service(), REVIEWED, Position::new(1, 1));
    h.session.request_review();
    h.pump().await;

    assert!(h.session.apply_corrections());
    assert_eq!(h.widget().text(), "a = 1\nprint(a)\n");
    assert_eq!(h.session.active_buffer().text, "a = 1\nprint(a)\n");
    assert!(h.session.review_report().is_none());
    assert_eq!(h.widget().review_markers().len(), 1, "markers outlive the panel");

    assert!(!h.session.apply_corrections());
    assert_eq!(h.widget().text(), "a = 1\nprint(a)\n");
}

#[tokio::test]
async fn closing_review_clears_markers() {
    let mut h = Harness::new(reviewing_service(), REVIEWED, Position::new(1, 1));
    h.session.request_review();
    h.pump().await;

    h.session.close_review();
    assert!(h.widget().review_markers().is_empty());
    assert!(h.session.review_report().is_none());
}

#[tokio::test]
async fn failed_review_releases_guard_and_keeps_panel() {
    let mut h = Harness::new(FakeService::default(), REVIEWED, Position::new(1, 1));
    assert!(h.session.request_review());
    h.pump().await;

    assert!(!h.session.review_in_flight());
    assert!(h.session.review_report().is_none());
    assert!(h.widget().review_markers().is_empty());
    assert!(h.session.request_review());
}

#[tokio::test]
async fn review_of_another_buffer_clears_old_markers() {
    let mut h = Harness::new(reviewing_service(), REVIEWED, Position::new(1, 1));
    let first = h.buffer_id.clone();
    h.session.request_review();
    h.pump().await;
    assert_eq!(h.widget().review_markers().len(), 1);

    let second = h.session.create_buffer();
    assert!(h.session.on_mount(&second, FakeWidget::default()));
    h.session.widget_mut(&second).unwrap().set_value(REVIEWED);
    h.session.on_text_changed(&second);
    h.session.request_review();
    h.pump().await;

    assert!(h.session.widget(&first).unwrap().review_markers().is_empty());
    assert_eq!(h.session.widget(&second).unwrap().review_markers().len(), 1);
}

// ---------------------------------------------------------------------------
// Execution and status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_service_yields_connectivity_error() {
    let mut h = Harness::new(FakeService::default(), "print(1)", Position::new(1, 1));
    assert!(h.session.run_active());
    assert!(!h.session.run_active());
    h.pump().await;

    let result = h.session.execution_result().unwrap();
    assert_eq!(result.stdout, "");
    assert_eq!(
        result.stderr.as_deref(),
        Some("Failed to compile code. Please check your connection and try again.")
    );
}

#[tokio::test]
async fn successful_run_is_shown_until_dismissed() {
    let service = FakeService::default();
    let output = ExecutionResult { stdout: "3\n".into(), stderr: None, duration_ms: Some(12) };
    *service.execution.lock().unwrap() = Some(output.clone());
    let mut h = Harness::new(service, "print(1 + 2)", Position::new(1, 1));

    assert!(h.session.run_active());
    h.pump().await;
    assert_eq!(h.session.execution_result(), Some(&output));
    assert!(!h.session.execution_in_flight());

    h.session.dismiss_output();
    assert!(h.session.execution_result().is_none());
}

#[tokio::test]
async fn status_probe_records_availability() {
    let service = FakeService { available: true, ..FakeService::default() };
    let mut h = Harness::new(service, "", Position::new(1, 1));
    assert_eq!(h.session.backend_available(), None);

    h.session.check_status();
    h.pump().await;
    assert_eq!(h.session.backend_available(), Some(true));
}

// ---------------------------------------------------------------------------
// Buffers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_buffer_uses_selected_language() {
    let mut h = Harness::new(FakeService::default(), "", Position::new(1, 1));
    h.session.set_language(Language::TypeScript);
    assert_eq!(h.widget().language, Some(Language::TypeScript));

    let id = h.session.create_buffer();
    assert_eq!(h.session.store().active_id(), id);
    let buffer = h.session.active_buffer();
    assert_eq!(buffer.language, Language::TypeScript);
    assert_eq!(buffer.text, Language::TypeScript.placeholder());

    let mut widget = FakeWidget::default();
    widget.set_value("stale");
    assert!(h.session.on_mount(&id, widget));
    assert_eq!(h.session.widget(&id).unwrap().text(), Language::TypeScript.placeholder());
    assert!(!h.session.on_mount("missing", FakeWidget::default()));
}
