//! Topic management
//!
//! A `Topic` maps each subscribed client to the connection its deliveries go
//! to. A client appears at most once per topic; subscribing again replaces
//! the stored handle.
//!
//! Concurrency note: callers must synchronize access to `Topic` through the
//! registry lock.

use std::collections::HashMap;

use tracing::warn;

use crate::client::{Connection, FrameKind};

pub type ClientId = String;

#[derive(Debug, Default)]
pub struct Topic {
    pub name: String,
    pub subscribers: HashMap<ClientId, Connection>,
}

impl Topic {
    /// Create a new topic with no subscribers.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: HashMap::new(),
        }
    }

    /// Add or replace a subscriber. Returns `true` when the client was not
    /// subscribed before.
    pub fn subscribe(&mut self, id: &str, conn: Connection) -> bool {
        self.subscribers.insert(id.to_string(), conn).is_none()
    }

    /// Remove a subscriber. Returns `true` when it was present.
    pub fn unsubscribe(&mut self, id: &str) -> bool {
        self.subscribers.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.subscribers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Sends `body` to every subscriber, in no particular order, and returns
    /// how many deliveries were queued. Failures are logged and skipped.
    pub fn deliver(&self, body: &str, kind: FrameKind) -> usize {
        let mut delivered = 0;
        for (client_id, conn) in &self.subscribers {
            match conn.send(kind, body) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(client_id = %client_id, topic = %self.name, "failed to deliver message: {e}")
                }
            }
        }
        delivered
    }
}
