//! The set of open buffers and the active-buffer selection.
//!
//! The store is the single owner of buffer text. It holds no I/O of its own:
//! callers serialize it with [`BufferStore::snapshot`] after each mutation and
//! rebuild it at startup with [`BufferStore::restore`].

use tracing::warn;

use crate::storage::PersistedState;
use crate::types::{Buffer, Language};

/// Serialized form of the store, ready to be written under the fixed keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub buffers_json: String,
    pub active_id: String,
}

/// Owns every open buffer plus the active id and the selected language.
///
/// Invariant: `buffers` is never empty and `active_id` always names one of them.
#[derive(Debug, Clone)]
pub struct BufferStore {
    buffers: Vec<Buffer>,
    active_id: String,
    selected_language: Language,
}

impl Default for BufferStore {
    /// The cold-start state: a single Python buffer, active.
    fn default() -> Self {
        let first = Buffer::new(Language::default());
        let active_id = first.id.clone();
        Self {
            buffers: vec![first],
            active_id,
            selected_language: Language::default(),
        }
    }
}

impl BufferStore {
    /// Rebuilds the store from persisted state.
    ///
    /// Absent, unparseable, or empty buffer lists fall back to the default
    /// state. An active id that names no restored buffer falls back to the
    /// first buffer. Never fails.
    pub fn restore(state: &PersistedState) -> Self {
        let buffers: Vec<Buffer> = match state.buffers_json.as_deref() {
            None => return Self::default(),
            Some(raw) => match serde_json::from_str(raw) {
                Ok(list) => list,
                Err(e) => {
                    warn!(error = %e, "persisted buffers are malformed; starting fresh");
                    return Self::default();
                }
            },
        };
        if buffers.is_empty() {
            return Self::default();
        }

        let active_id = state
            .active_id
            .as_ref()
            .filter(|id| buffers.iter().any(|b| &b.id == *id))
            .cloned()
            .unwrap_or_else(|| buffers[0].id.clone());
        let selected_language = buffers
            .iter()
            .find(|b| b.id == active_id)
            .map(|b| b.language)
            .unwrap_or_default();

        Self { buffers, active_id, selected_language }
    }

    /// Serializes the buffer list and active id for durable storage.
    pub fn snapshot(&self) -> StoreSnapshot {
        let buffers_json = serde_json::to_string(&self.buffers).unwrap_or_else(|_| "[]".to_owned());
        StoreSnapshot { buffers_json, active_id: self.active_id.clone() }
    }

    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    pub fn get(&self, id: &str) -> Option<&Buffer> {
        self.buffers.iter().find(|b| b.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Buffer> {
        self.buffers.iter_mut().find(|b| b.id == id)
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active(&self) -> &Buffer {
        // Invariant: active_id always references a live buffer.
        self.get(&self.active_id).unwrap_or(&self.buffers[0])
    }

    /// Language used for new buffers and new completion-provider registration.
    pub fn selected_language(&self) -> Language {
        self.selected_language
    }

    /// Appends a new buffer in `language`, makes it active, and returns it.
    pub fn create_buffer(&mut self, language: Language) -> &Buffer {
        let mut buffer = Buffer::new(language);
        while self.get(&buffer.id).is_some() {
            buffer = Buffer::new(language);
        }
        self.active_id = buffer.id.clone();
        self.buffers.push(buffer);
        &self.buffers[self.buffers.len() - 1]
    }

    /// Selects `id` as the active buffer. Unknown ids are ignored.
    ///
    /// Returns `true` when the selection changed.
    pub fn set_active(&mut self, id: &str) -> bool {
        if self.active_id == id || self.get(id).is_none() {
            return false;
        }
        self.active_id = id.to_owned();
        true
    }

    /// Replaces the full text of buffer `id`. Unknown ids are ignored.
    pub fn update_text(&mut self, id: &str, text: &str) -> bool {
        match self.get_mut(id) {
            Some(buffer) if buffer.text != text => {
                buffer.text = text.to_owned();
                true
            }
            _ => false,
        }
    }

    /// Changes the active buffer's language and the process-wide selected language.
    pub fn set_language(&mut self, language: Language) {
        self.selected_language = language;
        let active = self.active_id.clone();
        if let Some(buffer) = self.get_mut(&active) {
            buffer.language = language;
        }
    }

    /// Sets the comment-generation flag for buffer `id`.
    pub fn set_generation_in_flight(&mut self, id: &str, in_flight: bool) {
        if let Some(buffer) = self.get_mut(id) {
            buffer.generation_in_flight = in_flight;
        }
    }
}
