use std::sync::Mutex;
use std::time::Duration;

use futures::stream;
use tokio::sync::mpsc::UnboundedReceiver;
use tungstenite::Error as WsError;
use tungstenite::protocol::Message as WsMessage;

use super::handler::{GREETING_PREFIX, handle_connection};
use crate::broker::{Router, SubscriptionRegistry};
use crate::client::{Connection, FrameKind};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Publish {
        topic: String,
        body: String,
        kind: FrameKind,
    },
    Subscribe {
        client_id: String,
        topic: String,
    },
    Unsubscribe {
        client_id: String,
        topic: String,
    },
    Remove(String),
    List,
}

/// Stands in for the registry and records what the handler asked for.
#[derive(Default)]
struct RecordingRouter {
    calls: Mutex<Vec<Call>>,
}

impl RecordingRouter {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl Router for RecordingRouter {
    fn publish(&self, topic: &str, body: &str, kind: FrameKind) {
        self.record(Call::Publish {
            topic: topic.to_string(),
            body: body.to_string(),
            kind,
        });
    }

    fn subscribe(&self, client_id: &str, topic: &str, _conn: &Connection) {
        self.record(Call::Subscribe {
            client_id: client_id.to_string(),
            topic: topic.to_string(),
        });
    }

    fn unsubscribe(&self, client_id: &str, topic: &str) {
        self.record(Call::Unsubscribe {
            client_id: client_id.to_string(),
            topic: topic.to_string(),
        });
    }

    fn remove_client(&self, client_id: &str) {
        self.record(Call::Remove(client_id.to_string()));
    }

    fn list_topics(&self, _conn: &Connection) {
        self.record(Call::List);
    }
}

fn text(json: &str) -> Result<WsMessage, WsError> {
    Ok(WsMessage::text(json.to_string()))
}

fn recv_text(rx: &mut UnboundedReceiver<WsMessage>) -> String {
    match rx.try_recv().expect("expected a queued frame") {
        WsMessage::Text(text) => text.as_str().to_string(),
        other => panic!("Expected a text message, got {other:?}"),
    }
}

#[tokio::test]
async fn test_greeting_carries_client_id() {
    let router = RecordingRouter::default();
    let (conn, mut rx) = Connection::channel();

    let inbound = stream::iter(Vec::<Result<WsMessage, WsError>>::new());
    let client_id = handle_connection(inbound, conn, &router).await;

    let greeting = recv_text(&mut rx);
    assert_eq!(greeting, format!("{GREETING_PREFIX}{client_id}"));
    assert!(!client_id.is_empty());
}

#[tokio::test]
async fn test_frames_are_routed_then_client_removed_on_read_error() {
    let router = RecordingRouter::default();
    let (conn, _rx) = Connection::channel();
    let inbound = stream::iter(vec![
        text(r#"{"op":"subscribe","topic":"news"}"#),
        Ok(WsMessage::binary(
            br#"{"op":"publish","topic":"news","message":"hi"}"#.to_vec(),
        )),
        text(r#"{"op":"unsubscribe","topic":"news"}"#),
        text(r#"{"op":"list"}"#),
        Err(WsError::ConnectionClosed),
        text(r#"{"op":"list"}"#),
    ]);

    let client_id = handle_connection(inbound, conn, &router).await;

    assert_eq!(
        router.calls(),
        vec![
            Call::Subscribe {
                client_id: client_id.clone(),
                topic: "news".to_string(),
            },
            Call::Publish {
                topic: "news".to_string(),
                body: "hi".to_string(),
                kind: FrameKind::Binary,
            },
            Call::Unsubscribe {
                client_id: client_id.clone(),
                topic: "news".to_string(),
            },
            Call::List,
            Call::Remove(client_id),
        ]
    );
}

#[tokio::test]
async fn test_control_frames_are_not_routed() {
    let router = RecordingRouter::default();
    let (conn, _rx) = Connection::channel();
    let inbound = stream::iter(vec![
        Ok(WsMessage::Ping(Default::default())),
        Ok(WsMessage::Pong(Default::default())),
    ]);

    let client_id = handle_connection(inbound, conn, &router).await;

    assert_eq!(router.calls(), vec![Call::Remove(client_id)]);
}

#[tokio::test]
async fn test_close_frame_ends_the_loop() {
    let router = RecordingRouter::default();
    let (conn, _rx) = Connection::channel();
    let inbound = stream::iter(vec![
        Ok(WsMessage::Close(None)),
        text(r#"{"op":"list"}"#),
    ]);

    let client_id = handle_connection(inbound, conn, &router).await;

    assert_eq!(router.calls(), vec![Call::Remove(client_id)]);
}

#[tokio::test]
async fn test_closed_outbound_queue_ends_the_loop() {
    let router = RecordingRouter::default();
    let (conn, rx) = Connection::channel();
    drop(rx);

    let inbound = Box::pin(stream::pending::<Result<WsMessage, WsError>>());
    let client_id = tokio::time::timeout(
        Duration::from_secs(1),
        handle_connection(inbound, conn, &router),
    )
    .await
    .expect("handler should stop once the writer is gone");

    assert_eq!(router.calls(), vec![Call::Remove(client_id)]);
}

#[tokio::test]
async fn test_decode_failure_keeps_connection_usable() {
    let registry = SubscriptionRegistry::new();
    let (conn, mut rx) = Connection::channel();
    let inbound = stream::iter(vec![text("not json"), text(r#"{"op":"list"}"#)]);

    handle_connection(inbound, conn, &registry).await;

    assert!(recv_text(&mut rx).starts_with(GREETING_PREFIX));
    assert_eq!(recv_text(&mut rx), "server: failed to unmarshal payload");
    assert_eq!(recv_text(&mut rx), "server: unknown operation ''");
    assert_eq!(recv_text(&mut rx), "server has no topics, create one!");
}

#[tokio::test]
async fn test_disconnect_removes_every_subscription() {
    let registry = SubscriptionRegistry::new();
    let (conn, _rx) = Connection::channel();
    let inbound = stream::iter(vec![
        text(r#"{"op":"subscribe","topic":"a"}"#),
        text(r#"{"op":"subscribe","topic":"b"}"#),
    ]);

    let client_id = handle_connection(inbound, conn, &registry).await;

    assert!(!registry.is_subscribed(&client_id, "a"));
    assert!(!registry.is_subscribed(&client_id, "b"));
    assert_eq!(registry.subscriber_count("a"), Some(0));
    assert_eq!(registry.subscriber_count("b"), Some(0));
}
