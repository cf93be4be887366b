//! Relay connection: one owned WebSocket session to the relay server.
//!
//! LIFECYCLE
//! =========
//! 1. `connect` opens the socket and waits for `session:connected`
//! 2. `sign_in` / `send_message` write request frames; nothing waits for
//!    broadcast confirmation
//! 3. `next_event` yields decoded relay events until the socket closes
//! 4. `close` sends a close frame; dropping the connection also ends it

use std::time::Duration;

use frames::{EVENT_CONNECTED, EVENT_MESSAGE, FRAME_CLIENT_ID, FRAME_CODE, FRAME_MESSAGE, Frame, Status};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// How long `connect` waits for the welcome frame.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("websocket error: {0}")]
    Ws(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    Closed,
    #[error("timed out waiting for session:connected")]
    Timeout,
    #[error("frame codec error: {0}")]
    Codec(#[from] frames::CodecError),
    #[error("relay sent an invalid welcome frame")]
    BadWelcome,
}

impl From<tokio_tungstenite::tungstenite::Error> for ConnectionError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Ws(Box::new(error))
    }
}

/// Decoded event received from the relay.
#[derive(Clone, Debug, PartialEq)]
pub enum RelayEvent {
    /// A broadcast chat message.
    Message { content: String, from: Option<String> },
    /// An error reply to one of our requests.
    Error { code: Option<String>, message: String },
    /// Any other frame (acknowledgements, future events).
    Other(Frame),
}

impl RelayEvent {
    /// Classify a decoded frame.
    #[must_use]
    pub fn from_frame(frame: Frame) -> Self {
        if frame.status == Status::Error {
            return Self::Error {
                code: frame.str_field(FRAME_CODE).map(str::to_string),
                message: frame.str_field(FRAME_MESSAGE).unwrap_or("unknown relay error").to_string(),
            };
        }
        if frame.syscall == EVENT_MESSAGE && frame.status == Status::Request {
            if let Some(content) = frame.content() {
                return Self::Message { content: content.to_string(), from: frame.from.clone() };
            }
        }
        Self::Other(frame)
    }
}

pub struct RelayConnection {
    socket: Socket,
    client_id: Uuid,
}

impl RelayConnection {
    /// Open a connection to `url` (e.g. `ws://127.0.0.1:3000/socket`).
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] if the socket cannot be opened or the
    /// welcome frame does not arrive within [`CONNECT_TIMEOUT`].
    pub async fn connect(url: &str) -> Result<Self, ConnectionError> {
        let (mut socket, _) = connect_async(url).await?;

        let welcome = tokio::time::timeout(CONNECT_TIMEOUT, async {
            loop {
                let frame = recv_frame(&mut socket).await?;
                if frame.syscall == EVENT_CONNECTED {
                    return Ok::<Frame, ConnectionError>(frame);
                }
            }
        })
        .await
        .map_err(|_| ConnectionError::Timeout)??;

        let client_id = welcome
            .str_field(FRAME_CLIENT_ID)
            .and_then(|s| s.parse::<Uuid>().ok())
            .ok_or(ConnectionError::BadWelcome)?;

        info!(%client_id, url, "connection: established");
        Ok(Self { socket, client_id })
    }

    /// Connection id assigned by the relay.
    #[must_use]
    pub fn client_id(&self) -> Uuid {
        self.client_id
    }

    /// Announce a display name.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] if the frame cannot be written.
    pub async fn sign_in(&mut self, name: &str) -> Result<(), ConnectionError> {
        self.send_frame(&Frame::sign_in(name)).await
    }

    /// Send chat text to the relay. The text comes back as a broadcast.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] if the frame cannot be written.
    pub async fn send_message(&mut self, text: &str) -> Result<(), ConnectionError> {
        self.send_frame(&Frame::message(text)).await
    }

    /// Next event from the relay, or `None` once the socket has closed.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] on transport failure.
    pub async fn next_event(&mut self) -> Result<Option<RelayEvent>, ConnectionError> {
        match recv_frame(&mut self.socket).await {
            Ok(frame) => Ok(Some(RelayEvent::from_frame(frame))),
            Err(ConnectionError::Closed) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Close the socket.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] if the close frame cannot be written.
    pub async fn close(mut self) -> Result<(), ConnectionError> {
        info!(client_id = %self.client_id, "connection: closing");
        match self.socket.close(None).await {
            Ok(()) | Err(tokio_tungstenite::tungstenite::Error::ConnectionClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn send_frame(&mut self, frame: &Frame) -> Result<(), ConnectionError> {
        let text = frames::encode_frame(frame)?;
        debug!(id = %frame.id, syscall = %frame.syscall, "connection: send frame");
        self.socket.send(Message::Text(text.into())).await?;
        Ok(())
    }
}

async fn recv_frame(socket: &mut Socket) -> Result<Frame, ConnectionError> {
    loop {
        let Some(message) = socket.next().await else {
            return Err(ConnectionError::Closed);
        };
        match message {
            Ok(Message::Text(text)) => match frames::decode_frame(text.as_str()) {
                Ok(frame) => return Ok(frame),
                Err(e) => warn!(error = %e, "connection: dropping undecodable frame"),
            },
            Ok(Message::Close(_))
            | Err(
                tokio_tungstenite::tungstenite::Error::ConnectionClosed
                | tokio_tungstenite::tungstenite::Error::AlreadyClosed,
            ) => return Err(ConnectionError::Closed),
            Ok(_) => {}
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;
