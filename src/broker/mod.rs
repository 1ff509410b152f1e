//! The `broker` module holds the routing core: the subscription registry,
//! the [`Router`] contract the transport drives, and the codec for inbound
//! operation envelopes.

pub mod engine;
pub mod message;
pub mod router;
pub mod topic;

pub use engine::SubscriptionRegistry;
pub use router::Router;
