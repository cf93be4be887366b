//! WebSocket handler: bidirectional frame relay.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID, registers the client with the relay,
//! and enters a `select!` loop:
//! - Incoming client frames → parse + dispatch by syscall
//! - Broadcast frames from the relay → forward to client
//!
//! Inbound processing returns the frames meant for the sender only (errors
//! and acknowledgements). Broadcasts, including the sender's own copy of a
//! `message`, arrive through the client's relay channel.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → register → send `session:connected` with `client_id`
//! 2. Client sends `sign-in` / `message` frames → dispatch
//! 3. Close → deregister → log

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use frames::{
    Data, EVENT_CONNECTED, EVENT_GATEWAY_ERROR, EVENT_MESSAGE, EVENT_SIGN_IN, FRAME_CLIENT_ID, FRAME_MESSAGE,
    FRAME_NAME, Frame, Status,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services::relay::{self, RelayError};
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();

    // Per-connection channel for receiving broadcast frames.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(state.config.client_buffer);

    // Register before the welcome so nothing sent after it is missed.
    relay::join(&state, client_id, client_tx).await;

    let welcome = Frame::request(EVENT_CONNECTED, Data::new()).with_data(FRAME_CLIENT_ID, client_id.to_string());
    if send_frame(&mut socket, &welcome).await.is_ok() {
        let clients = relay::client_count(&state).await;
        info!(%client_id, clients, "ws: client connected");

        loop {
            tokio::select! {
                msg = socket.recv() => {
                    let Some(msg) = msg else { break };
                    let Ok(msg) = msg else { break };
                    match msg {
                        Message::Text(text) => {
                            let replies = process_inbound_text(&state, client_id, &text).await;
                            if send_all(&mut socket, &replies).await.is_err() {
                                break;
                            }
                        }
                        Message::Close(_) => break,
                        _ => {}
                    }
                }
                Some(frame) = client_rx.recv() => {
                    if send_frame(&mut socket, &frame).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    relay::part(&state, client_id).await;
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and process one inbound text frame and return frames for the sender.
///
/// This keeps the websocket transport concerns separate from frame handling,
/// so tests can exercise dispatch without a socket.
async fn process_inbound_text(state: &AppState, client_id: Uuid, text: &str) -> Vec<Frame> {
    let req = match frames::decode_frame(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            let err = Frame::request(EVENT_GATEWAY_ERROR, Data::new()).with_data(FRAME_MESSAGE, e.to_string());
            return vec![err];
        }
    };

    if req.status != Status::Request {
        debug!(%client_id, id = %req.id, status = ?req.status, "ws: ignoring non-request frame");
        return vec![];
    }

    info!(%client_id, id = %req.id, syscall = %req.syscall, "ws: recv frame");

    let result = match req.syscall.as_str() {
        EVENT_MESSAGE => handle_message(state, client_id, &req).await,
        EVENT_SIGN_IN => handle_sign_in(state, client_id, &req).await,
        other => Err(RelayError::UnknownEvent(other.to_string())),
    };

    match result {
        Ok(replies) => replies,
        Err(e) => vec![req.error_from(&e)],
    }
}

/// `message`: relay to everyone. The sender's copy arrives via its channel.
async fn handle_message(state: &AppState, client_id: Uuid, req: &Frame) -> Result<Vec<Frame>, RelayError> {
    let Some(content) = req.content() else {
        return Err(RelayError::InvalidPayload("content must be a string"));
    };
    relay::relay_message(state, client_id, content).await?;
    Ok(vec![])
}

/// `sign-in`: record the display name and acknowledge.
async fn handle_sign_in(state: &AppState, client_id: Uuid, req: &Frame) -> Result<Vec<Frame>, RelayError> {
    let Some(name) = req.str_field(FRAME_NAME) else {
        return Err(RelayError::InvalidPayload("name must be a string"));
    };
    relay::sign_in(state, client_id, name).await?;
    Ok(vec![req.done()])
}

// =============================================================================
// HELPERS
// =============================================================================

/// Send replies in order, stopping at the first failed write.
async fn send_all(socket: &mut WebSocket, replies: &[Frame]) -> Result<(), ()> {
    for frame in replies {
        send_frame(socket, frame).await?;
    }
    Ok(())
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match frames::encode_frame(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    if frame.status == Status::Error {
        let code = frame.str_field(frames::FRAME_CODE).unwrap_or("-");
        let message = frame.str_field(FRAME_MESSAGE).unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    } else {
        debug!(id = %frame.id, syscall = %frame.syscall, status = ?frame.status, "ws: send frame");
    }
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
