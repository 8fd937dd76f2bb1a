//! Remembered notification subscription.

/// The most recently issued notification subscription: replayed verbatim
/// after every reconnect so the server resumes pushing without the caller
/// re-subscribing.
///
/// The institution key is part of the contract; the older institution-less
/// subscribe shape is not supported.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationIntent {
    /// User the notifications are for.
    pub user_id: String,
    /// Institution whose queue the notifications concern.
    pub institution_id: String,
    /// Event kinds of interest (e.g. `queue_ready`, `queue_called`).
    pub types: Vec<String>,
}
