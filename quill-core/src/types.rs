use serde::{Deserialize, Serialize};

/// Source language of a buffer.
///
/// Selects both the widget's syntax mode and the language tag sent to the
/// remote service. Serialized lowercase, which is also the wire form.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    JavaScript,
    TypeScript,
    Html,
    Css,
    Java,
}

impl Language {
    /// Every supported language, in selector order.
    pub const ALL: [Language; 6] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Html,
        Language::Css,
        Language::Java,
    ];

    /// The lowercase tag used on the wire and in persisted state.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Html => "html",
            Language::Css => "css",
            Language::Java => "java",
        }
    }

    /// Seed text for a freshly created buffer, written as a comment in the
    /// language's own syntax.
    pub fn placeholder(self) -> &'static str {
        match self {
            Language::Python => "# Type your code here\n",
            Language::JavaScript | Language::TypeScript | Language::Java => {
                "// Type your code here\n"
            }
            Language::Html => "<!-- Type your code here -->\n",
            Language::Css => "/* Type your code here */\n",
        }
    }

    /// File extension used to pick a syntax definition for highlighting.
    pub fn file_extension(self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::JavaScript => "js",
            Language::TypeScript => "ts",
            Language::Html => "html",
            Language::Css => "css",
            Language::Java => "java",
        }
    }

    /// Returns the language after `self` in selector order (wraps around).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cursor or insertion position inside a buffer, 1-based on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// An inclusive range of lines currently scrolled into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleRange {
    pub start_line: usize,
    pub end_line: usize,
}

/// One independently edited unit of source text.
///
/// `id` is the identity. `generation_in_flight` is runtime-only state for the
/// comment-trigger detector and is never persisted, so a restored buffer always
/// starts idle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buffer {
    pub id: String,
    pub text: String,
    pub language: Language,
    #[serde(skip)]
    pub generation_in_flight: bool,
}

impl Buffer {
    /// Creates a buffer with a fresh UUID v4 id, seeded with the language placeholder.
    pub fn new(language: Language) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: language.placeholder().to_owned(),
            language,
            generation_in_flight: false,
        }
    }
}

/// Widget-native completion item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    Method,
    Function,
    Constructor,
    Field,
    Variable,
    Class,
    Struct,
    Interface,
    Module,
    Property,
    Event,
    Operator,
    Unit,
    Value,
    Constant,
    Enum,
    EnumMember,
    Keyword,
    Text,
    Color,
    File,
    Reference,
    Folder,
    TypeParameter,
    Snippet,
}

impl CompletionKind {
    /// Maps the service's free-form `kind` string onto a widget kind.
    ///
    /// Matching ignores ASCII case. Anything unrecognized degrades to `Text`.
    pub fn from_remote(kind: &str) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "method" => Self::Method,
            "function" => Self::Function,
            "constructor" => Self::Constructor,
            "field" => Self::Field,
            "variable" => Self::Variable,
            "class" => Self::Class,
            "struct" => Self::Struct,
            "interface" => Self::Interface,
            "module" => Self::Module,
            "property" => Self::Property,
            "event" => Self::Event,
            "operator" => Self::Operator,
            "unit" => Self::Unit,
            "value" => Self::Value,
            "constant" => Self::Constant,
            "enum" => Self::Enum,
            "enummember" => Self::EnumMember,
            "keyword" => Self::Keyword,
            "color" => Self::Color,
            "file" => Self::File,
            "reference" => Self::Reference,
            "folder" => Self::Folder,
            "typeparameter" => Self::TypeParameter,
            "snippet" => Self::Snippet,
            _ => Self::Text,
        }
    }

    /// Short tag shown next to the label in a completion menu.
    pub fn short_label(self) -> &'static str {
        match self {
            Self::Method | Self::Function | Self::Constructor => "fn",
            Self::Field | Self::Property => "fld",
            Self::Variable => "var",
            Self::Class | Self::Struct | Self::Interface => "type",
            Self::Module | Self::Folder | Self::File => "mod",
            Self::Keyword => "kw",
            Self::Snippet => "snip",
            Self::Constant | Self::Value | Self::EnumMember | Self::Enum => "const",
            _ => "txt",
        }
    }
}

/// A completion item ready for the widget's completion UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
    pub detail: String,
    pub insert_text: String,
}

/// Review diagnostic severity as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
}

impl Severity {
    /// Maps the service's `type` string. Unknown values fall to `Suggestion`,
    /// the lowest severity.
    pub fn from_remote(kind: &str) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "warning" => Self::Warning,
            _ => Self::Suggestion,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Suggestion => "suggestion",
        }
    }
}

/// One review finding; `line` is 1-based and absolute in the full buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: usize,
    pub message: String,
    pub suggestion: String,
}

/// A complete review response. Replaced wholesale by every new review.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewReport {
    pub diagnostics: Vec<Diagnostic>,
    pub corrected_text: Option<String>,
    pub summary: String,
}

/// Output of a remote compile/execute run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: Option<String>,
    pub duration_ms: Option<u64>,
}

impl ExecutionResult {
    /// The result shown when the service could not be reached at all.
    pub fn connectivity_failure() -> Self {
        Self {
            stdout: String::new(),
            stderr: Some(
                "Failed to compile code. Please check your connection and try again.".to_owned(),
            ),
            duration_ms: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.stderr.as_deref().is_some_and(|s| !s.is_empty())
    }
}
