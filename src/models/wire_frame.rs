//! The envelope carried on the realtime channel.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One frame on the realtime event channel: a named event plus an opaque
/// JSON payload.
///
/// The session only ever decodes inbound traffic to this envelope; payload
/// interpretation happens in the consumer (see
/// [`QueuePayload`](crate::models::QueuePayload)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFrame {
    /// Event name as sent on the wire (pre-aliasing).
    pub event: String,
    /// Event payload; `null` when the event carries none.
    #[serde(default)]
    pub data: Value,
}

impl WireFrame {
    /// Build a frame from an event name and payload.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}
