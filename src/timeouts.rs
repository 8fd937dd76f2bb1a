//! Timeout configuration for REST operations.

use std::time::Duration;

/// Timeouts applied by [`MediqClient`](crate::MediqClient) to its HTTP
/// requests. The realtime session carries its own connect timeout in
/// [`SessionOptions`](crate::SessionOptions).
///
/// # Examples
///
/// ```rust
/// use mediq_link::MediqTimeouts;
/// use std::time::Duration;
///
/// let timeouts = MediqTimeouts::default()
///     .with_request_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct MediqTimeouts {
    /// Timeout for establishing connections (TCP + TLS handshake).
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Timeout for a full request/response exchange.
    /// Default: 30 seconds
    pub request_timeout: Duration,
}

impl Default for MediqTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl MediqTimeouts {
    /// Timeouts suited to localhost development.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
        }
    }

    /// Set the connection timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
