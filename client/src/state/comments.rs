//! Comment store: the ordered comment list owned by one session.
//!
//! DESIGN
//! ======
//! Every mutation updates the in-memory list first and then writes the
//! updated list through the persistence adapter, so storage never lags the
//! displayed state. Ids come from a counter owned by the store rather than
//! from list position. Persistence is best-effort: write failures are
//! logged and the in-memory list stays authoritative.

use tracing::{debug, warn};

use crate::state::comment::{Comment, CommentId};
use crate::util::persistence::CommentPersistence;
use crate::util::storage::KeyValueStorage;

#[derive(Debug)]
pub struct CommentStore<S> {
    comments: Vec<Comment>,
    next_id: u64,
    persistence: CommentPersistence<S>,
}

impl<S: KeyValueStorage> CommentStore<S> {
    /// Hydrate a store from whatever `persistence` currently holds.
    pub fn new(persistence: CommentPersistence<S>) -> Self {
        let comments = persistence.load();
        let next_id = comments.iter().map(|c| c.id.0).max().unwrap_or(0) + 1;
        debug!(count = comments.len(), next_id, "store: hydrated");
        Self { comments, next_id, persistence }
    }

    /// Comments in storage order.
    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }

    /// Append a new comment with the next id. Whitespace-only text is
    /// rejected and returns `None`.
    pub fn add_comment(&mut self, text: &str) -> Option<CommentId> {
        if text.trim().is_empty() {
            return None;
        }
        let id = CommentId(self.next_id);
        self.next_id += 1;
        self.comments.push(Comment::new(id, text));
        self.persist();
        Some(id)
    }

    /// Increment one comment's favorite count. Returns `false` (and writes
    /// nothing) when no comment has `id`. Lists loaded from older stores may
    /// repeat an id; only the first match is incremented.
    pub fn increment_favorite(&mut self, id: CommentId) -> bool {
        let Some(comment) = self.comments.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        comment.favorite_count = comment.favorite_count.saturating_add(1);
        self.persist();
        true
    }

    /// Increment every comment's favorite count by one.
    pub fn increment_all_favorites(&mut self) {
        for comment in &mut self.comments {
            comment.favorite_count = comment.favorite_count.saturating_add(1);
        }
        self.persist();
    }

    /// Empty the list and the persisted copy.
    pub fn clear_all(&mut self) {
        self.comments.clear();
        self.next_id = 1;
        if let Err(e) = self.persistence.clear() {
            warn!(error = %e, "store: failed to clear persisted comments");
        }
    }

    /// Mean favorite count, 0 for an empty list.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_favorite(&self) -> f64 {
        if self.comments.is_empty() {
            return 0.0;
        }
        let total: u64 = self.comments.iter().map(|c| u64::from(c.favorite_count)).sum();
        total as f64 / self.comments.len() as f64
    }

    /// Whether `comment` sits strictly above the current average.
    #[must_use]
    pub fn is_above_average(&self, comment: &Comment) -> bool {
        f64::from(comment.favorite_count) > self.average_favorite()
    }

    fn persist(&self) {
        if let Err(e) = self.persistence.save_all(&self.comments) {
            warn!(error = %e, count = self.comments.len(), "store: failed to persist comments");
        }
    }
}

#[cfg(test)]
#[path = "comments_test.rs"]
mod tests;
