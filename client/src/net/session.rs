//! Chat session: one relay connection bound to one comment store.
//!
//! DESIGN
//! ======
//! The session owns both halves explicitly; there is no shared connection
//! handle. Submitted text is only sent: the record is appended when the
//! relay's broadcast comes back, exactly like every other client. Favorites,
//! cheer, and clear are local mutations with no server round trip.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::net::connection::{ConnectionError, RelayConnection, RelayEvent};
use crate::state::comment::CommentId;
use crate::state::comments::CommentStore;
use crate::util::storage::KeyValueStorage;
use crate::view::input::{Action, is_submittable};

/// What applying an action did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Text was sent to the relay.
    Sent,
    /// The store changed; re-render.
    Changed,
    /// Nothing changed (blank text, unknown id, or a plain re-render).
    Unchanged,
    /// The user asked to end the session.
    Quit,
}

pub struct ChatSession<S> {
    connection: RelayConnection,
    store: CommentStore<S>,
}

impl<S: KeyValueStorage> ChatSession<S> {
    pub fn new(connection: RelayConnection, store: CommentStore<S>) -> Self {
        Self { connection, store }
    }

    #[must_use]
    pub fn store(&self) -> &CommentStore<S> {
        &self.store
    }

    #[must_use]
    pub fn client_id(&self) -> Uuid {
        self.connection.client_id()
    }

    /// Announce a display name to the relay.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] if the frame cannot be written.
    pub async fn sign_in(&mut self, name: &str) -> Result<(), ConnectionError> {
        self.connection.sign_in(name).await
    }

    /// Send `text` to the relay. Whitespace-only text is dropped and
    /// returns `false`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] if the frame cannot be written.
    pub async fn submit(&mut self, text: &str) -> Result<bool, ConnectionError> {
        if !is_submittable(text) {
            return Ok(false);
        }
        self.connection.send_message(text).await?;
        Ok(true)
    }

    /// Apply one relay event to the store. Returns the new comment's id when
    /// the event appended one.
    pub fn handle_event(&mut self, event: &RelayEvent) -> Option<CommentId> {
        match event {
            RelayEvent::Message { content, from } => {
                let id = self.store.add_comment(content);
                debug!(?id, from = from.as_deref().unwrap_or("-"), "session: message appended");
                id
            }
            RelayEvent::Error { code, message } => {
                warn!(code = code.as_deref().unwrap_or("-"), message = %message, "session: relay error");
                None
            }
            RelayEvent::Other(frame) => {
                debug!(syscall = %frame.syscall, status = ?frame.status, "session: ignoring frame");
                None
            }
        }
    }

    /// Wait for the next relay event and apply it. `None` once the relay
    /// has closed the connection.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] on transport failure.
    pub async fn next_event(&mut self) -> Result<Option<RelayEvent>, ConnectionError> {
        let Some(event) = self.connection.next_event().await? else {
            return Ok(None);
        };
        self.handle_event(&event);
        Ok(Some(event))
    }

    /// Dispatch a view action.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] if a submission cannot be written.
    pub async fn apply(&mut self, action: Action) -> Result<ActionOutcome, ConnectionError> {
        let outcome = match action {
            Action::Submit(text) => {
                if self.submit(&text).await? {
                    ActionOutcome::Sent
                } else {
                    ActionOutcome::Unchanged
                }
            }
            Action::Favorite(id) => {
                if self.store.increment_favorite(id) {
                    ActionOutcome::Changed
                } else {
                    ActionOutcome::Unchanged
                }
            }
            Action::CheerAll => {
                self.store.increment_all_favorites();
                ActionOutcome::Changed
            }
            Action::ClearAll => {
                self.store.clear_all();
                ActionOutcome::Changed
            }
            Action::List => ActionOutcome::Unchanged,
            Action::Quit => ActionOutcome::Quit,
        };
        Ok(outcome)
    }

    /// Close the connection and hand back the store.
    pub async fn shutdown(self) -> CommentStore<S> {
        if let Err(e) = self.connection.close().await {
            warn!(error = %e, "session: close failed");
        }
        self.store
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
