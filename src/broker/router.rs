//! Router contract
//!
//! The connection handler only needs the five routing operations plus
//! `dispatch`, so it is written against this trait rather than against the
//! concrete registry. `dispatch` is provided once here in terms of the other
//! five.

use tracing::{debug, warn};

use crate::broker::message::{
    self, DECODE_FAILURE_NOTICE, OpKind, Operation, unknown_operation_notice,
};
use crate::client::{Connection, FrameKind};

pub trait Router: Send + Sync {
    /// Fan `body` out to every current subscriber of `topic` using `kind`.
    /// An unknown topic is created with no subscribers.
    fn publish(&self, topic: &str, body: &str, kind: FrameKind);

    /// Add `client_id` to `topic`, creating the topic if needed. Subscribing
    /// twice leaves a single membership.
    fn subscribe(&self, client_id: &str, topic: &str, conn: &Connection);

    /// Drop the `(client_id, topic)` pairing. Missing topic or membership is
    /// a no-op.
    fn unsubscribe(&self, client_id: &str, topic: &str);

    /// Drop `client_id` from every topic. Topics are kept even when emptied.
    fn remove_client(&self, client_id: &str);

    /// Report topics and subscriber counts to `conn`.
    fn list_topics(&self, conn: &Connection);

    /// Decode one inbound frame and route it.
    ///
    /// A payload that fails to decode gets a failure notice and is then
    /// routed as an empty operation, which also draws an unknown-operation
    /// notice. The connection stays usable either way.
    fn dispatch(&self, client_id: &str, conn: &Connection, kind: FrameKind, payload: &[u8]) {
        let op = match message::decode(payload) {
            Ok(op) => op,
            Err(e) => {
                warn!(client_id = %client_id, "failed to decode payload: {e}");
                notify(conn, DECODE_FAILURE_NOTICE);
                Operation::default()
            }
        };
        debug!(client_id = %client_id, op = %op.kind, topic = %op.topic, "dispatching operation");

        match OpKind::parse(&op.kind) {
            Some(OpKind::Publish) => self.publish(&op.topic, &op.message, kind),
            Some(OpKind::Subscribe) => self.subscribe(client_id, &op.topic, conn),
            Some(OpKind::Unsubscribe) => self.unsubscribe(client_id, &op.topic),
            Some(OpKind::Remove) => self.remove_client(client_id),
            Some(OpKind::List) => self.list_topics(conn),
            None => {
                warn!(client_id = %client_id, op = %op.kind, "unknown operation");
                notify(conn, &unknown_operation_notice(&op.kind));
            }
        }
    }
}

/// Best-effort text reply to the requesting connection.
pub(crate) fn notify(conn: &Connection, text: &str) {
    if let Err(e) = conn.send_text(text) {
        debug!("dropping reply to closed connection: {e}");
    }
}
