//! # mediq-link
//!
//! Client library for the MediQ patient-queue service: a reconnecting
//! realtime session over WebSocket plus the REST fallback client, and the
//! reconciliation layer that keeps rendered queue state consistent between
//! the two.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use mediq_link::{MediqClient, QueueWatcher, RealtimeSession, SessionOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = RealtimeSession::new(SessionOptions::from_env());
//! let client = MediqClient::builder()
//!     .base_url("http://localhost:3000")
//!     .token_cell(session.token_cell())
//!     .build()?;
//!
//! let watcher = QueueWatcher::spawn(session, client, "inst-1");
//! let mut snapshots = watcher.snapshot_rx();
//!
//! while snapshots.changed().await.is_ok() {
//!     if let Some(snapshot) = snapshots.borrow().as_ref() {
//!         println!(
//!             "serving: {:?}, waiting: {}",
//!             snapshot.serving.as_ref().map(|e| &e.number),
//!             snapshot.waiting.len()
//!         );
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The session survives connection loss on its own: it reconnects with
//! bounded exponential backoff and replays the last subscription intents so
//! a network blip is invisible to the rest of the application. Consumers
//! treat any reconnect as "re-fetch a full snapshot"; [`QueueWatcher`] does
//! that wiring for you.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod session;
pub mod timeouts;
pub mod view;
pub mod watcher;

pub use auth::TokenCell;
pub use client::{MediqClient, MediqClientBuilder};
pub use error::{MediqLinkError, Result};
pub use models::{
    ClientMessage, Institution, NotificationIntent, QueueEntry, QueuePayload, QueueSnapshot,
    QueueStatus, SessionOptions, SnapshotSource, WireFrame,
};
pub use session::{events, EventCallback, RealtimeSession};
pub use timeouts::MediqTimeouts;
pub use view::{QueueView, ViewAction};
pub use watcher::QueueWatcher;
