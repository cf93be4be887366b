//! Local persistence adapter for the comment list.
//!
//! DESIGN
//! ======
//! The whole list lives under one storage key and is rewritten on every
//! change. Reads never fail: an absent, unreadable, or unparsable value
//! loads as an empty list. There is no schema version.

use tracing::warn;

use crate::state::comment::Comment;
use crate::util::storage::{KeyValueStorage, StorageError};

/// Storage key holding the serialized comment list.
pub const COMMENTS_KEY: &str = "comments";

#[derive(Debug, Clone)]
pub struct CommentPersistence<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> CommentPersistence<S> {
    /// Adapter over `storage` using the default [`COMMENTS_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, COMMENTS_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    /// Load the stored list, or an empty list if absent or invalid.
    #[must_use]
    pub fn load(&self) -> Vec<Comment> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "persistence: read failed, starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(e) => {
                warn!(key = %self.key, error = %e, "persistence: stored list unparsable, starting empty");
                Vec::new()
            }
        }
    }

    /// Overwrite the stored list with `comments`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if serialization or the write fails.
    pub fn save_all(&self, comments: &[Comment]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(comments)?;
        self.storage.set_item(&self.key, &raw)
    }

    /// Remove the stored list.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(&self.key)
    }
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
