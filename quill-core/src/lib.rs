//! Core of the quill editor: buffers, durable state, and the AI-assisted
//! workflows (windowed autocomplete, comment-to-code, review, execution)
//! driven through an abstract text widget.

pub mod buffers;
pub mod client;
pub mod comment;
pub mod debounce;
pub mod error;
pub mod execution;
pub mod persist;
pub mod review;
pub mod schema;
pub mod session;
pub mod storage;
pub mod suggest;
pub mod types;
pub mod widget;
pub mod window;
pub mod wire;

pub use buffers::BufferStore;
pub use client::{AssistService, HttpAssistClient};
pub use error::{ServiceError, StorageError};
pub use session::{Session, SessionConfig, SessionEvent};
pub use widget::{EditorWidget, Marker, MarkerSeverity};
