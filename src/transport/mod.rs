//! The `transport` module carries client traffic over WebSockets.
//!
//! `websocket` accepts connections and performs the upgrade; `handler` runs
//! the per-connection read loop that feeds frames to the broker's router.

pub mod handler;
pub mod websocket;

pub use handler::{GREETING_PREFIX, handle_connection};
pub use websocket::{serve, start_websocket_server};

#[cfg(test)]
mod tests;
