use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tungstenite::protocol::Message as WsMessage;

use crate::utils::{PubSubError, Result};

/// Payload kind carried by a WebSocket data frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Text,
    Binary,
}

impl FrameKind {
    /// Wraps `body` in a frame of this kind.
    pub fn frame(self, body: &str) -> WsMessage {
        match self {
            FrameKind::Text => WsMessage::text(body.to_owned()),
            FrameKind::Binary => WsMessage::binary(body.as_bytes().to_vec()),
        }
    }
}

/// Write handle for one accepted connection.
///
/// Frames are queued on an unbounded channel that the transport drains into
/// the socket, so `send` never waits on the network. Clones share the same
/// queue; the registry stores one clone per subscription.
#[derive(Debug, Clone)]
pub struct Connection {
    sender: UnboundedSender<WsMessage>,
}

impl Connection {
    pub fn new(sender: UnboundedSender<WsMessage>) -> Self {
        Self { sender }
    }

    /// Creates a handle together with the receiving end of its queue.
    pub fn channel() -> (Self, UnboundedReceiver<WsMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn send(&self, kind: FrameKind, body: &str) -> Result<()> {
        self.sender
            .send(kind.frame(body))
            .map_err(|_| PubSubError::ConnectionClosed)
    }

    pub fn send_text(&self, body: &str) -> Result<()> {
        self.send(FrameKind::Text, body)
    }

    /// Resolves once the outbound side has stopped draining the queue.
    pub async fn closed(&self) {
        self.sender.closed().await
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
