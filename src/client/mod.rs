//! The `client` module defines how the broker talks back to a connected
//! client.
//!
//! A client has no stored entity of its own: it is an identifier minted by
//! the transport plus a [`Connection`] handle that the registry keeps under
//! each topic the client has joined.

pub mod connection;
pub use connection::{Connection, FrameKind};

#[cfg(test)]
mod tests;
