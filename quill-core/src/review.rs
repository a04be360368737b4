//! Whole-buffer review: single-flight guard, diagnostic panel state, and
//! projection of diagnostics onto widget markers.

use crate::types::{Diagnostic, ReviewReport};
use crate::widget::{EditorWidget, Marker, MarkerSeverity};

/// Review state shared by the whole session (one review at a time, globally).
#[derive(Debug, Default)]
pub struct ReviewOrchestrator {
    in_flight: bool,
    /// Buffer the open panel's diagnostics belong to.
    buffer_id: Option<String>,
    /// The open panel's report; `None` when the panel is dismissed.
    report: Option<ReviewReport>,
}

impl ReviewOrchestrator {
    /// Claims the single-flight slot. Returns `false` if a review is already out.
    pub fn begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Releases the slot and, on success, replaces the panel wholesale.
    pub fn complete(&mut self, buffer_id: &str, report: Option<ReviewReport>) {
        self.in_flight = false;
        if let Some(report) = report {
            self.buffer_id = Some(buffer_id.to_owned());
            self.report = Some(report);
        }
    }

    pub fn report(&self) -> Option<&ReviewReport> {
        self.report.as_ref()
    }

    pub fn buffer_id(&self) -> Option<&str> {
        self.buffer_id.as_deref()
    }

    /// Takes the corrected text for "Apply Corrections" and dismisses the panel.
    ///
    /// Returns `None` (and changes nothing) when the panel is closed or the
    /// report carries no correction, which makes a repeated apply a no-op.
    pub fn take_corrections(&mut self) -> Option<(String, String)> {
        let corrected = self.report.as_ref()?.corrected_text.clone()?;
        let buffer_id = self.buffer_id.clone()?;
        self.report = None;
        Some((buffer_id, corrected))
    }

    /// Dismisses the panel, returning the buffer whose markers should be cleared.
    pub fn close(&mut self) -> Option<String> {
        self.report.take()?;
        self.buffer_id.clone()
    }
}

/// Marker text: the message followed by the suggestion on its own line.
pub fn marker_message(diagnostic: &Diagnostic) -> String {
    format!("{}\nSuggestion: {}", diagnostic.message, diagnostic.suggestion)
}

/// Projects `diagnostics` onto full-width line markers in `widget`.
///
/// Reported lines outside the buffer are clamped to its first or last line.
pub fn project_markers<W: EditorWidget + ?Sized>(
    widget: &W,
    diagnostics: &[Diagnostic],
) -> Vec<Marker> {
    let last_line = widget.line_count().max(1);
    diagnostics
        .iter()
        .map(|d| {
            let line = d.line.clamp(1, last_line);
            Marker {
                severity: MarkerSeverity::from(d.severity),
                start_line: line,
                start_column: 1,
                end_line: line,
                end_column: widget.line_max_column(line),
                message: marker_message(d),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn report(corrected: Option<&str>) -> ReviewReport {
        ReviewReport {
            diagnostics: vec![Diagnostic {
                severity: Severity::Warning,
                line: 1,
                message: "m".into(),
                suggestion: "s".into(),
            }],
            corrected_text: corrected.map(str::to_owned),
            summary: "sum".into(),
        }
    }

    #[test]
    fn second_begin_is_refused_until_complete() {
        let mut review = ReviewOrchestrator::default();
        assert!(review.begin());
        assert!(!review.begin());
        review.complete("b", None);
        assert!(!review.in_flight());
        assert!(review.report().is_none());
        assert!(review.begin());
    }

    #[test]
    fn apply_twice_is_a_no_op_the_second_time() {
        let mut review = ReviewOrchestrator::default();
        review.begin();
        review.complete("b", Some(report(Some("fixed\n"))));
        assert_eq!(review.take_corrections(), Some(("b".to_owned(), "fixed\n".to_owned())));
        assert_eq!(review.take_corrections(), None);
        assert!(review.report().is_none());
    }

    #[test]
    fn apply_without_correction_keeps_panel_open() {
        let mut review = ReviewOrchestrator::default();
        review.begin();
        review.complete("b", Some(report(None)));
        assert_eq!(review.take_corrections(), None);
        assert!(review.report().is_some());
        assert_eq!(review.close(), Some("b".to_owned()));
        assert_eq!(review.close(), None);
    }
}
