//! Configuration for the realtime session.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_reconnect_delay_ms() -> u64 {
    1000
}

fn default_max_reconnect_delay_ms() -> u64 {
    30_000
}

fn default_connection_timeout_ms() -> u64 {
    10_000
}

fn default_keepalive_interval_ms() -> u64 {
    25_000
}

fn default_pong_timeout_ms() -> u64 {
    10_000
}

/// Options controlling the realtime session's endpoint, reconnection and
/// keepalive behavior.
///
/// # Example
///
/// ```rust
/// use mediq_link::SessionOptions;
///
/// let options = SessionOptions::new("http://localhost:3000")
///     .with_max_reconnect_attempts(10)
///     .with_reconnect_delay_ms(500);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Server base URL. `http(s)` schemes are converted to `ws(s)` and the
    /// `/ws` path is appended when the URL carries no explicit path.
    #[serde(default = "default_url")]
    pub url: String,

    /// Consecutive failed reconnects tolerated before the session gives up.
    /// Default: 5. A later manual `connect()` starts over from zero.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Initial delay between reconnection attempts, doubled per attempt.
    /// Default: 1000 ms.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Ceiling for the exponential backoff. Default: 30 000 ms.
    #[serde(default = "default_max_reconnect_delay_ms")]
    pub max_reconnect_delay_ms: u64,

    /// Timeout for the WebSocket handshake. Default: 10 000 ms.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// Idle interval between keepalive pings; `0` disables keepalive.
    /// Default: 25 000 ms.
    #[serde(default = "default_keepalive_interval_ms")]
    pub keepalive_interval_ms: u64,

    /// How long to wait for any frame after a keepalive ping before the
    /// connection is considered dead; `0` disables the check.
    /// Default: 10 000 ms.
    #[serde(default = "default_pong_timeout_ms")]
    pub pong_timeout_ms: u64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_delay_ms: default_max_reconnect_delay_ms(),
            connection_timeout_ms: default_connection_timeout_ms(),
            keepalive_interval_ms: default_keepalive_interval_ms(),
            pong_timeout_ms: default_pong_timeout_ms(),
        }
    }
}

impl SessionOptions {
    /// Options for a given server URL, defaults everywhere else.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Options from the `MEDIQ_SOCKET_URL` environment variable, falling
    /// back to `http://localhost:3000`.
    pub fn from_env() -> Self {
        match std::env::var("MEDIQ_SOCKET_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }

    /// Set the reconnect-attempt ceiling.
    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Set the initial reconnect delay in milliseconds.
    pub fn with_reconnect_delay_ms(mut self, delay_ms: u64) -> Self {
        self.reconnect_delay_ms = delay_ms;
        self
    }

    /// Set the backoff ceiling in milliseconds.
    pub fn with_max_reconnect_delay_ms(mut self, max_delay_ms: u64) -> Self {
        self.max_reconnect_delay_ms = max_delay_ms;
        self
    }

    /// Set the handshake timeout in milliseconds.
    pub fn with_connection_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.connection_timeout_ms = timeout_ms;
        self
    }

    /// Set the keepalive ping interval in milliseconds (`0` disables).
    pub fn with_keepalive_interval_ms(mut self, interval_ms: u64) -> Self {
        self.keepalive_interval_ms = interval_ms;
        self
    }

    /// Set the pong timeout in milliseconds (`0` disables).
    pub fn with_pong_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.pong_timeout_ms = timeout_ms;
        self
    }

    /// Backoff delay before reconnect attempt number `attempt` (0-based):
    /// `reconnect_delay_ms * 2^attempt`, capped at `max_reconnect_delay_ms`.
    pub fn reconnect_delay(&self, attempt: u32) -> Duration {
        let delay = std::cmp::min(
            self.reconnect_delay_ms
                .saturating_mul(2u64.saturating_pow(attempt)),
            self.max_reconnect_delay_ms,
        );
        Duration::from_millis(delay)
    }

    /// Handshake timeout as a [`Duration`].
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }
}
