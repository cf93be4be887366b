//! Local relay stand-ins for connection and session tests.

use frames::{Data, EVENT_CONNECTED, EVENT_MESSAGE, EVENT_SIGN_IN, FRAME_CLIENT_ID, Frame};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

/// Single-connection relay stand-in: welcomes the client with `client_id`
/// and echoes every `message` back as a broadcast stamped `from = "echo"`.
pub async fn spawn_echo_relay(client_id: Option<Uuid>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    tokio::spawn(async move {
        let Ok((tcp, _)) = listener.accept().await else { return };
        let Ok(mut ws) = tokio_tungstenite::accept_async(tcp).await else { return };

        let mut welcome = Frame::request(EVENT_CONNECTED, Data::new());
        if let Some(id) = client_id {
            welcome = welcome.with_data(FRAME_CLIENT_ID, id.to_string());
        }
        let text = frames::encode_frame(&welcome).expect("encode");
        if ws.send(Message::Text(text.into())).await.is_err() {
            return;
        }

        while let Some(Ok(msg)) = ws.next().await {
            let Message::Text(text) = msg else { continue };
            let Ok(req) = frames::decode_frame(text.as_str()) else { continue };
            let reply = if req.syscall == EVENT_MESSAGE {
                Frame::message(req.content().unwrap_or_default()).with_from("echo")
            } else if req.syscall == EVENT_SIGN_IN {
                req.done()
            } else {
                req.error("unknown event")
            };
            let text = frames::encode_frame(&reply).expect("encode");
            if ws.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    format!("ws://{addr}")
}

