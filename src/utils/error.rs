//! Error types used across `wspubsub`.
//!
//! Only binding the listening socket is fatal to the process. Every other
//! variant is scoped to a single connection or a single inbound frame.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PubSubError {
    /// The listening socket could not be bound at startup.
    #[error("failed to bind listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// An inbound payload was not a valid operation envelope.
    #[error("failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The outbound side of a connection is gone.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, PubSubError>;
