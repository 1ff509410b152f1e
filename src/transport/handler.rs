//! Connection handler
//!
//! Runs the read side of one client connection: mint an identifier, greet
//! the client, then route every inbound data frame until the connection
//! fails. On the way out the client is removed from every topic. Reads are
//! never retried; a reconnecting client comes back with a new identifier.

use futures::Stream;
use futures_util::StreamExt;
use tracing::{debug, error, info, warn};
use tungstenite::Error as WsError;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::broker::Router;
use crate::client::{Connection, FrameKind};

/// Prefix of the greeting sent to every new client; the client id follows.
pub const GREETING_PREFIX: &str = "server: new client ";

pub fn mint_client_id() -> String {
    Uuid::new_v4().to_string()
}

/// Drives one connection until its inbound stream fails, ends, sends a close
/// frame, or its outbound queue is closed by a failed write.
///
/// Returns the identifier the client was known by.
pub async fn handle_connection<S, R>(mut inbound: S, conn: Connection, router: &R) -> String
where
    S: Stream<Item = Result<WsMessage, WsError>> + Unpin,
    R: Router + ?Sized,
{
    let client_id = mint_client_id();
    info!(client_id = %client_id, "client connected");

    if let Err(e) = conn.send_text(&format!("{GREETING_PREFIX}{client_id}")) {
        warn!(client_id = %client_id, "failed to send greeting: {e}");
    }

    loop {
        let next = tokio::select! {
            frame = inbound.next() => frame,
            _ = conn.closed() => {
                error!(client_id = %client_id, "failed to write message to socket");
                break;
            }
        };

        match next {
            Some(Ok(WsMessage::Text(text))) => {
                router.dispatch(&client_id, &conn, FrameKind::Text, text.as_bytes())
            }
            Some(Ok(WsMessage::Binary(data))) => {
                router.dispatch(&client_id, &conn, FrameKind::Binary, &data)
            }
            Some(Ok(WsMessage::Close(frame))) => {
                info!(client_id = %client_id, ?frame, "client closed connection");
                break;
            }
            // ping/pong are answered by the websocket layer
            Some(Ok(other)) => debug!(client_id = %client_id, ?other, "ignoring control frame"),
            Some(Err(e)) => {
                error!(client_id = %client_id, "failed to read message from socket: {e}");
                break;
            }
            None => {
                info!(client_id = %client_id, "connection stream ended");
                break;
            }
        }
    }

    router.remove_client(&client_id);
    client_id
}
