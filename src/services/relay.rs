//! Relay service: client registry, sign-in, and message fan-out.
//!
//! DESIGN
//! ======
//! The relay forwards every `message` to every connected client, sender
//! included. Nothing is stored: a client's registry entry (outbound channel
//! plus optional display name) is added on connect and removed on
//! disconnect.
//!
//! ERROR HANDLING
//! ==============
//! Fan-out is best-effort. Each client has its own bounded channel and is
//! fed with `try_send`; a full or closed channel skips that client only.

use frames::{ErrorCode, Frame};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::{AppState, ConnectedClient};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("sign-in required before sending messages")]
    NotSignedIn,
    #[error("invalid payload: {0}")]
    InvalidPayload(&'static str),
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    #[error("client not connected: {0}")]
    NotConnected(Uuid),
}

impl ErrorCode for RelayError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotSignedIn => "E_NOT_SIGNED_IN",
            Self::InvalidPayload(_) => "E_INVALID_PAYLOAD",
            Self::UnknownEvent(_) => "E_UNKNOWN_EVENT",
            Self::NotConnected(_) => "E_NOT_CONNECTED",
        }
    }
}

// =============================================================================
// JOIN / PART
// =============================================================================

/// Register a connected client so it receives broadcasts.
pub async fn join(state: &AppState, client_id: Uuid, tx: mpsc::Sender<Frame>) {
    let mut clients = state.clients.write().await;
    clients.insert(client_id, ConnectedClient::new(tx));
    info!(%client_id, connected = clients.len(), "relay: client joined");
}

/// Remove a client from the registry. Returns its last state, if any.
pub async fn part(state: &AppState, client_id: Uuid) -> Option<ConnectedClient> {
    let mut clients = state.clients.write().await;
    let removed = clients.remove(&client_id);
    info!(
        %client_id,
        name = removed.as_ref().and_then(|c| c.name.as_deref()).unwrap_or("-"),
        connected = clients.len(),
        "relay: client parted"
    );
    removed
}

/// Number of currently registered clients.
pub async fn client_count(state: &AppState) -> usize {
    state.clients.read().await.len()
}

// =============================================================================
// SIGN-IN
// =============================================================================

/// Record a display name for a client. Returns the previous name, if any.
///
/// # Errors
///
/// Returns [`RelayError::InvalidPayload`] for a whitespace-only name and
/// [`RelayError::NotConnected`] if the client is not registered.
pub async fn sign_in(state: &AppState, client_id: Uuid, name: &str) -> Result<Option<String>, RelayError> {
    if name.trim().is_empty() {
        return Err(RelayError::InvalidPayload("name must not be blank"));
    }

    let mut clients = state.clients.write().await;
    let Some(client) = clients.get_mut(&client_id) else {
        return Err(RelayError::NotConnected(client_id));
    };
    let previous = client.name.replace(name.to_string());
    info!(%client_id, name, "relay: sign-in received");
    Ok(previous)
}

// =============================================================================
// MESSAGE
// =============================================================================

/// Relay chat text from `client_id` to every connected client, sender
/// included. Returns the number of clients the frame was queued for.
///
/// # Errors
///
/// Returns [`RelayError::NotSignedIn`] when sign-in gating is on and the
/// sender has not signed in, and [`RelayError::NotConnected`] if the sender
/// is not registered.
pub async fn relay_message(state: &AppState, client_id: Uuid, content: &str) -> Result<usize, RelayError> {
    let frame = {
        let clients = state.clients.read().await;
        let Some(sender) = clients.get(&client_id) else {
            return Err(RelayError::NotConnected(client_id));
        };
        if state.config.require_sign_in && !sender.is_signed_in() {
            return Err(RelayError::NotSignedIn);
        }

        let frame = Frame::message(content);
        match &sender.name {
            Some(name) => frame.with_from(name.clone()),
            None => frame,
        }
    };

    info!(%client_id, len = content.len(), "relay: message received");
    Ok(broadcast(state, &frame).await)
}

// =============================================================================
// BROADCAST
// =============================================================================

/// Send a frame to every connected client. Returns the number of clients the
/// frame was queued for.
pub async fn broadcast(state: &AppState, frame: &Frame) -> usize {
    let clients = state.clients.read().await;

    let mut delivered = 0;
    for (client_id, client) in clients.iter() {
        match client.tx.try_send(frame.clone()) {
            Ok(()) => delivered += 1,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(%client_id, syscall = %frame.syscall, "relay: client channel full, frame dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(%client_id, "relay: client channel closed");
            }
        }
    }
    delivered
}

#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;
