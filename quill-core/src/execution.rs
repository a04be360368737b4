//! Remote compile-and-run, guarded independently of review.

use crate::error::ServiceError;
use crate::types::ExecutionResult;

#[derive(Debug, Default)]
pub struct ExecutionOrchestrator {
    in_flight: bool,
    result: Option<ExecutionResult>,
}

impl ExecutionOrchestrator {
    /// Claims the single-flight slot and clears the previous output.
    ///
    /// Returns `false`, leaving everything untouched, if a run is already out.
    pub fn begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        self.result = None;
        true
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Releases the slot and records the outcome. Any failure becomes a
    /// synthesized connectivity error so the output panel always has content.
    pub fn complete(&mut self, outcome: Result<ExecutionResult, ServiceError>) {
        self.in_flight = false;
        self.result = Some(outcome.unwrap_or_else(|_| ExecutionResult::connectivity_failure()));
    }

    pub fn result(&self) -> Option<&ExecutionResult> {
        self.result.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.result = None;
    }
}
