use super::connection::{Connection, FrameKind};
use tungstenite::protocol::Message as WsMessage;

#[test]
fn test_send_text_frame() {
    let (conn, mut rx) = Connection::channel();
    conn.send_text("hello").unwrap();

    match rx.try_recv().unwrap() {
        WsMessage::Text(text) => assert_eq!(text.as_str(), "hello"),
        other => panic!("Expected a text message, got {other:?}"),
    }
}

#[test]
fn test_send_keeps_binary_kind() {
    let (conn, mut rx) = Connection::channel();
    conn.send(FrameKind::Binary, "raw").unwrap();

    match rx.try_recv().unwrap() {
        WsMessage::Binary(data) => assert_eq!(&data[..], b"raw"),
        other => panic!("Expected a binary message, got {other:?}"),
    }
}

#[test]
fn test_send_after_receiver_dropped_fails() {
    let (conn, rx) = Connection::channel();
    assert!(!conn.is_closed());

    drop(rx);

    assert!(conn.is_closed());
    assert!(conn.send_text("lost").is_err());
}

#[tokio::test]
async fn test_closed_resolves_when_receiver_dropped() {
    let (conn, rx) = Connection::channel();
    drop(rx);
    tokio::time::timeout(std::time::Duration::from_secs(1), conn.closed())
        .await
        .expect("closed() should resolve once the receiver is gone");
}
