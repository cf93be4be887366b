//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the parsed configuration and the registry of connected clients.
//! The relay keeps no message history: a client's entry lives exactly as
//! long as its socket.

use std::collections::HashMap;
use std::sync::Arc;

use frames::Frame;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::config::ServerConfig;

// =============================================================================
// CONNECTED CLIENT
// =============================================================================

/// Per-connection relay state.
#[derive(Debug, Clone)]
pub struct ConnectedClient {
    /// Sender for outgoing frames; drained by the connection task.
    pub tx: mpsc::Sender<Frame>,
    /// Display name from `sign-in`, if the client sent one.
    pub name: Option<String>,
}

impl ConnectedClient {
    #[must_use]
    pub fn new(tx: mpsc::Sender<Frame>) -> Self {
        Self { tx, name: None }
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.name.is_some()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Connected clients: `client_id` -> relay state.
    pub clients: Arc<RwLock<HashMap<Uuid, ConnectedClient>>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self { config: Arc::new(config), clients: Arc::new(RwLock::new(HashMap::new())) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
