//! Accepted wire shapes for a full queue list.
//!
//! Different backend versions push the same full-list payload as a bare
//! array, as `{"queue": [...]}` or as `{"queueData": [...]}`. The union is
//! resolved here, once, into `Vec<QueueEntry>`; nothing past this boundary
//! ever sees the shape ambiguity.

use serde::Deserialize;
use serde_json::Value;

use super::queue_entry::QueueEntry;

/// A full queue list in any of its accepted wire shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QueuePayload {
    /// Bare array: `[{...}, {...}]`
    Entries(Vec<QueueEntry>),
    /// Wrapped: `{"queue": [...]}`
    Wrapped { queue: Vec<QueueEntry> },
    /// Keyed: `{"queueData": [...]}`
    Keyed {
        #[serde(rename = "queueData")]
        queue_data: Vec<QueueEntry>,
    },
}

impl QueuePayload {
    /// Collapse the union into the entry list.
    pub fn into_entries(self) -> Vec<QueueEntry> {
        match self {
            Self::Entries(entries) => entries,
            Self::Wrapped { queue } => queue,
            Self::Keyed { queue_data } => queue_data,
        }
    }

    /// Try to read a full list out of an opaque event payload.
    ///
    /// Returns `None` when the payload is not a full list in any accepted
    /// shape — the caller should treat such an event as a signal to
    /// re-fetch, not as data to merge.
    pub fn entries_from_value(value: &Value) -> Option<Vec<QueueEntry>> {
        serde_json::from_value::<QueuePayload>(value.clone())
            .ok()
            .map(QueuePayload::into_entries)
    }
}
