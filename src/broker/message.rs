//! Message codec
//!
//! Inbound frames carry a JSON envelope:
//!
//! ```json
//! {"op": "publish", "topic": "news", "message": "hi"}
//! ```
//!
//! Every field is optional; a missing or `null` field reads as an empty
//! string, and a bare `null` payload is an empty operation. `message` is only
//! read by `publish`. Anything else that is not a JSON object of strings
//! fails to decode; callers fall back to [`Operation::default`] so the frame
//! is still routed (and reported as an unknown operation).

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::utils::Result;

/// Notice sent when a payload cannot be decoded.
pub const DECODE_FAILURE_NOTICE: &str = "server: failed to unmarshal payload";

/// Reply to `list` when the registry holds no topics.
pub const NO_TOPICS_NOTICE: &str = "server has no topics, create one!";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Operation {
    #[serde(rename = "op", deserialize_with = "null_as_empty")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub topic: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub message: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The five operations a client can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Publish,
    Subscribe,
    Unsubscribe,
    Remove,
    List,
}

impl OpKind {
    /// Case-insensitive lookup; `None` for anything unrecognized.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.to_lowercase().as_str() {
            "publish" => Some(OpKind::Publish),
            "subscribe" => Some(OpKind::Subscribe),
            "unsubscribe" => Some(OpKind::Unsubscribe),
            "remove" => Some(OpKind::Remove),
            "list" => Some(OpKind::List),
            _ => None,
        }
    }
}

pub fn decode(payload: &[u8]) -> Result<Operation> {
    // Derived structs also accept JSON arrays, so the shape is checked first.
    match serde_json::from_slice::<Value>(payload)? {
        Value::Null => Ok(Operation::default()),
        value @ Value::Object(_) => Ok(serde_json::from_value(value)?),
        _ => Err(serde_json::Error::custom("expected a JSON object").into()),
    }
}

/// Reply naming an operation kind the router does not understand.
pub fn unknown_operation_notice(kind: &str) -> String {
    format!("server: unknown operation '{kind}'")
}
