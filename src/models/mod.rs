//! Data models for the mediq-link client library.
//!
//! Wire envelopes and payload shapes for the realtime channel, plus the
//! queue/institution types shared with the REST client.

pub mod client_message;
pub mod institution;
pub mod notification_intent;
pub mod queue_entry;
pub mod queue_payload;
pub mod queue_snapshot;
pub mod session_options;
pub mod utils;
pub mod wire_frame;

pub use client_message::ClientMessage;
pub use institution::Institution;
pub use notification_intent::NotificationIntent;
pub use queue_entry::{QueueEntry, QueueStatus};
pub use queue_payload::QueuePayload;
pub use queue_snapshot::{QueueSnapshot, SnapshotSource};
pub use session_options::SessionOptions;
pub use wire_frame::WireFrame;
