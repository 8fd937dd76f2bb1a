//! REST client for the MediQ queue service.
//!
//! The pull-based half of the queue contract: screens fetch the full queue
//! list here on mount, on a periodic timer, and whenever the realtime
//! session signals that something changed. Also carries the admin mutation
//! actions that indirectly cause push events.

use reqwest::{Method, StatusCode};

use crate::auth::TokenCell;
use crate::error::{MediqLinkError, Result};
use crate::models::{Institution, QueueEntry, QueuePayload, QueueStatus};
use crate::timeouts::MediqTimeouts;

/// REST client for the MediQ backend.
///
/// Use [`MediqClient::builder`] to construct instances.
///
/// # Examples
///
/// ```rust,no_run
/// use mediq_link::MediqClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MediqClient::builder()
///     .base_url("http://localhost:3000")
///     .build()?;
///
/// let queue = client.get_queue(Some("inst-1")).await?;
/// println!("{} entries", queue.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MediqClient {
    base_url: String,
    http_client: reqwest::Client,
    token: TokenCell,
    api_key: Option<String>,
}

impl MediqClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> MediqClientBuilder {
        MediqClientBuilder::new()
    }

    /// The token cell this client authenticates with. Share it with a
    /// [`RealtimeSession`](crate::RealtimeSession) so both halves rotate
    /// together.
    pub fn token_cell(&self) -> TokenCell {
        self.token.clone()
    }

    /// Fetch the full queue list, optionally scoped to one institution.
    ///
    /// Accepts every payload shape the backend has used for this endpoint
    /// (bare array, `{"queue": [...]}`, `{"queueData": [...]}`).
    pub async fn get_queue(&self, institution_id: Option<&str>) -> Result<Vec<QueueEntry>> {
        let mut request = self.request(Method::GET, "/queue");
        if let Some(id) = institution_id {
            request = request.query(&[("institutionId", id)]);
        }

        let response = Self::check_status(request.send().await?).await?;
        let payload = response.json::<QueuePayload>().await?;
        Ok(payload.into_entries())
    }

    /// Fetch the institution directory.
    pub async fn get_institutions(&self) -> Result<Vec<Institution>> {
        let response = Self::check_status(self.request(Method::GET, "/institutions").send().await?)
            .await?;
        Ok(response.json::<Vec<Institution>>().await?)
    }

    /// Call the next patient (admin action). The server answers by pushing
    /// queue events to subscribed sessions.
    pub async fn call_queue(&self, id: &str) -> Result<()> {
        let path = format!("/queue/{}/call", id);
        Self::check_status(self.request(Method::POST, &path).send().await?).await?;
        Ok(())
    }

    /// Set one entry's status (admin action).
    pub async fn update_queue_status(&self, id: &str, status: QueueStatus) -> Result<()> {
        let path = format!("/queue/{}/status", id);
        let response = self
            .request(Method::PATCH, &path)
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .http_client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }
        if let Some(token) = self.token.get() {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status: StatusCode = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(MediqLinkError::ApiError {
            status: status.as_u16(),
            message,
        })
    }
}

/// Builder for configuring [`MediqClient`] instances.
pub struct MediqClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    token: TokenCell,
    timeouts: MediqTimeouts,
}

impl MediqClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            token: TokenCell::new(),
            timeouts: MediqTimeouts::default(),
        }
    }

    /// Set the base URL for the MediQ backend (required).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the `x-api-key` header attached to every request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the initial bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token.set(Some(token.into()));
        self
    }

    /// Share an existing token cell (e.g. the realtime session's) instead
    /// of creating one.
    pub fn token_cell(mut self, cell: TokenCell) -> Self {
        self.token = cell;
        self
    }

    /// Set request timeouts.
    pub fn timeouts(mut self, timeouts: MediqTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<MediqClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| MediqLinkError::ConfigurationError("base_url is required".into()))?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let http_client = reqwest::Client::builder()
            .timeout(self.timeouts.request_timeout)
            .connect_timeout(self.timeouts.connection_timeout)
            .build()
            .map_err(|e| MediqLinkError::ConfigurationError(e.to_string()))?;

        Ok(MediqClient {
            base_url,
            http_client,
            token: self.token,
            api_key: self.api_key,
        })
    }
}
