//! Event names on the realtime channel.
//!
//! Listeners register under the *logical* names below. The server has
//! emitted some events under more than one wire name across versions; the
//! alias table is the single place where those spellings are folded back
//! into one logical event.

/// Connection established (synthetic; payload is `null`).
pub const CONNECT: &str = "connect";
/// Connection closed (synthetic; payload `{"reason": ...}`).
pub const DISCONNECT: &str = "disconnect";
/// Transport or server error (payload `{"message": ...}`).
pub const ERROR: &str = "error";
/// Automatic reconnection gave up (synthetic; payload `{"attempts": n}`).
/// A manual `connect()` is required from here on.
pub const RECONNECT_EXHAUSTED: &str = "reconnect_exhausted";

/// Queue state changed; payload may be a full list or a partial signal.
pub const QUEUE_UPDATE: &str = "queue_update";
/// The subscribed user is next.
pub const QUEUE_READY: &str = "queue_ready";
/// The subscribed user is close to being called.
pub const QUEUE_ALMOST_READY: &str = "queue_almost_ready";
/// The subscribed user has been called.
pub const QUEUE_CALLED: &str = "queue_called";
/// The subscribed user's visit is done.
pub const QUEUE_COMPLETED: &str = "queue_completed";

/// Wire name -> logical name. Consulted at dispatch time only.
const ALIASES: &[(&str, &str)] = &[
    ("queue_updated", QUEUE_UPDATE),
    ("queue_status", QUEUE_UPDATE),
];

/// Resolve a wire event name to its logical name.
///
/// Names without an alias entry pass through unchanged, so unknown server
/// events still reach listeners registered under the wire spelling.
pub fn logical_event(wire: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == wire)
        .map(|(_, logical)| *logical)
        .unwrap_or(wire)
}

/// Whether an event only signals "something changed" without carrying the
/// full queue list — consumers must re-fetch rather than merge.
pub fn is_signal_event(event: &str) -> bool {
    matches!(
        event,
        QUEUE_READY | QUEUE_ALMOST_READY | QUEUE_CALLED | QUEUE_COMPLETED
    )
}
