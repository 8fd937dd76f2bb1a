//! Shared bearer-token storage.
//!
//! The REST client and the realtime session authenticate with the same
//! token, and the token can be rotated at any time (login, refresh). A
//! [`TokenCell`] is a cheaply clonable handle to that single credential so
//! both halves always observe the latest value.
//!
//! Persistence of credentials (`token` / `refreshToken` / `id`) belongs to
//! the embedding application's storage layer; this cell is in-memory only.

use std::sync::{Arc, RwLock};

/// Shared, rotatable bearer token.
///
/// # Examples
///
/// ```rust
/// use mediq_link::TokenCell;
///
/// let cell = TokenCell::new();
/// assert!(!cell.is_set());
///
/// cell.set(Some("eyJhbGc...".to_string()));
/// assert_eq!(cell.get().as_deref(), Some("eyJhbGc..."));
///
/// cell.set(None);
/// assert!(!cell.is_set());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TokenCell {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenCell {
    /// Create an empty cell (no credential).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cell pre-populated with a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let cell = Self::new();
        cell.set(Some(token.into()));
        cell
    }

    /// Replace the stored token. `None` (or an empty string) clears it.
    pub fn set(&self, token: Option<String>) {
        let token = token.filter(|t| !t.is_empty());
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = token;
    }

    /// Current token, if any.
    pub fn get(&self) -> Option<String> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }

    /// Whether a credential is currently stored.
    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}
