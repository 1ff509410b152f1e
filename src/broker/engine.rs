//! Subscription registry
//!
//! `SubscriptionRegistry` owns the mapping from topic name to subscriber set
//! and implements [`Router`] on top of it.
//!
//! Concurrency and usage notes:
//! - All state sits behind one registry-wide `RwLock`; there are no per-topic
//!   locks. `publish` and `list_topics` take it shared, `subscribe`,
//!   `unsubscribe` and `remove_client` take it exclusively.
//! - Fan-out happens while the shared lock is held. Deliveries only enqueue
//!   onto each connection's outbound channel, so a slow socket delays its
//!   own queue and never the other subscribers or other topics.
//! - Topics are never removed. An empty subscriber set is a valid state.
//! - The registry is an ordinary value: construct one, wrap it in `Arc`, and
//!   hand it to the transport. Nothing is global.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use crate::broker::message::NO_TOPICS_NOTICE;
use crate::broker::router::{Router, notify};
use crate::broker::topic::Topic;
use crate::client::{Connection, FrameKind};

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    topics: RwLock<HashMap<String, Topic>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic in one connection task must not wedge the registry for the
    // rest, so poisoned guards are recovered.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Topic>> {
        self.topics.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Topic>> {
        self.topics.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Topic names mapped to their subscriber counts, sorted by name.
    pub fn topic_counts(&self) -> BTreeMap<String, usize> {
        counts(&self.read())
    }

    pub fn topic_count(&self) -> usize {
        self.read().len()
    }

    /// `None` when the topic has never been created.
    pub fn subscriber_count(&self, topic: &str) -> Option<usize> {
        self.read().get(topic).map(Topic::len)
    }

    pub fn is_subscribed(&self, client_id: &str, topic: &str) -> bool {
        self.read()
            .get(topic)
            .is_some_and(|t| t.contains(client_id))
    }
}

fn counts(topics: &HashMap<String, Topic>) -> BTreeMap<String, usize> {
    topics
        .iter()
        .map(|(name, topic)| (name.clone(), topic.len()))
        .collect()
}

impl Router for SubscriptionRegistry {
    fn publish(&self, topic: &str, body: &str, kind: FrameKind) {
        info!(topic = %topic, "publishing message");

        {
            let topics = self.read();
            if let Some(t) = topics.get(topic) {
                let delivered = t.deliver(body, kind);
                info!(topic = %topic, delivered, "published message");
                return;
            }
        }

        // Unknown topic: reserve the name, deliver to nobody. Another writer
        // may have created it between the two locks, in which case the entry
        // is left as is.
        self.write()
            .entry(topic.to_string())
            .or_insert_with(|| Topic::new(topic));
        info!(topic = %topic, "created topic on publish");
    }

    fn subscribe(&self, client_id: &str, topic: &str, conn: &Connection) {
        info!(client_id = %client_id, topic = %topic, "adding subscriber");

        let mut topics = self.write();
        let added = topics
            .entry(topic.to_string())
            .or_insert_with(|| Topic::new(topic))
            .subscribe(client_id, conn.clone());
        if !added {
            info!(client_id = %client_id, topic = %topic, "replaced existing subscription");
        }
    }

    fn unsubscribe(&self, client_id: &str, topic: &str) {
        info!(client_id = %client_id, topic = %topic, "removing subscriber");

        let mut topics = self.write();
        if topics
            .get_mut(topic)
            .is_some_and(|t| t.unsubscribe(client_id))
        {
            info!(client_id = %client_id, topic = %topic, "removed subscription");
        }
    }

    fn remove_client(&self, client_id: &str) {
        info!(client_id = %client_id, "removing subscriber from all topics");

        let mut topics = self.write();
        for (name, topic) in topics.iter_mut() {
            if topic.unsubscribe(client_id) {
                info!(client_id = %client_id, topic = %name, "removed subscription");
            }
        }
    }

    fn list_topics(&self, conn: &Connection) {
        info!("listing all topics");

        let topics = self.read();
        if topics.is_empty() {
            notify(conn, NO_TOPICS_NOTICE);
            return;
        }

        match serde_json::to_string(&counts(&topics)) {
            Ok(json) => notify(conn, &json),
            Err(e) => warn!("failed to serialize topic list: {e}"),
        }
    }
}
