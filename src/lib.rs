//! # wspubsub
//!
//! `wspubsub` is an in-memory, topic-based publish/subscribe router served
//! over WebSockets. Clients connect, receive an identifier, and then send
//! JSON operations to subscribe, unsubscribe, publish, leave every topic, or
//! list topics with their subscriber counts.
//!
//! ## Core Modules
//!
//! - `broker`: the subscription registry, the `Router` contract and the
//!   operation codec.
//! - `client`: the write handle the registry keeps for each subscriber.
//! - `config`: layered settings loading.
//! - `transport`: the WebSocket server and the per-connection handler.
//! - `utils`: error types and logging setup.
//!
//! Delivery is best-effort and in memory only; nothing is persisted.

pub mod broker;
pub mod client;
pub mod config;
pub mod transport;
pub mod utils;
