//! JSON shapes exchanged with the assist service.
//!
//! Requests serialize exactly as the service expects. Responses decode
//! leniently: missing optional fields take defaults so a partially filled
//! body still yields something usable, and conversion into the core types
//! happens through `From` impls below.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{
    CompletionItem, CompletionKind, Diagnostic, ExecutionResult, Language, ReviewReport,
    Severity, VisibleRange,
};

/// Body of `POST /autocomplete`. `line`/`column` are relative to `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteRequest {
    pub source: String,
    pub full_source: String,
    pub line: usize,
    pub column: usize,
    pub language: Language,
    pub visible_ranges: Vec<VisibleRange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutocompleteResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub data: Vec<RemoteCompletion>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCompletion {
    pub label: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub detail: String,
    #[serde(default)]
    pub insert_text: Option<String>,
}

/// Decodes a list entry by entry, skipping entries that do not fit `T`.
/// A missing or `null` list is empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect())
}

/// Takes a string as is; `null`, numbers, and other shapes become empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

impl From<RemoteCompletion> for CompletionItem {
    fn from(remote: RemoteCompletion) -> Self {
        let insert_text = remote.insert_text.unwrap_or_else(|| remote.label.clone());
        CompletionItem {
            kind: CompletionKind::from_remote(&remote.kind),
            label: remote.label,
            detail: remote.detail,
            insert_text,
        }
    }
}

/// Body of `POST /generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    pub comment: String,
    pub context: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub generated_code: String,
}

/// Body of `POST /review` and `POST /compile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeRequest {
    pub code: String,
    pub language: Language,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub issues: Vec<RemoteIssue>,
    #[serde(default)]
    pub corrected_code: Option<String>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteIssue {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    pub line: usize,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub suggestion: String,
}

impl From<ReviewResponse> for ReviewReport {
    fn from(remote: ReviewResponse) -> Self {
        ReviewReport {
            diagnostics: remote
                .issues
                .into_iter()
                .map(|issue| Diagnostic {
                    severity: Severity::from_remote(&issue.kind),
                    line: issue.line,
                    message: issue.message,
                    suggestion: issue.suggestion,
                })
                .collect(),
            corrected_text: remote.corrected_code.filter(|code| !code.is_empty()),
            summary: remote.summary,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResponse {
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub error: Option<String>,
    /// Milliseconds; the service may send a fractional number.
    #[serde(default)]
    pub execution_time: Option<f64>,
}

impl From<CompileResponse> for ExecutionResult {
    fn from(remote: CompileResponse) -> Self {
        ExecutionResult {
            stdout: remote.output,
            stderr: remote.error,
            duration_ms: remote
                .execution_time
                .filter(|ms| ms.is_finite() && *ms >= 0.0)
                .map(|ms| ms.round() as u64),
        }
    }
}
