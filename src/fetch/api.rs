//! Client for the reports REST API.

use crate::config::ApiConfig;
use crate::fetch::FetchError;
use crate::models::Summary;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info};

/// HTTP client bound to one summary endpoint.
///
/// Each call is a single request: failures are reported, never retried.
pub struct ApiClient {
    http_client: reqwest::Client,
    summary_url: Url,
    token: Option<String>,
    timeout_seconds: u64,
}

impl ApiClient {
    /// Create a client from the `[api]` settings.
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let summary_url = summary_url(&config.base_url, &config.summary_path)?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("tribute/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            summary_url,
            token: config.token.clone().filter(|t| !t.is_empty()),
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// The endpoint this client fetches from.
    pub fn summary_url(&self) -> &Url {
        &self.summary_url
    }

    /// Fetch and decode the summary snapshot.
    pub async fn fetch_summary(&self) -> Result<Summary, FetchError> {
        info!("Fetching summary from {}", self.summary_url);

        let mut request = self.http_client.get(self.summary_url.clone());
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout_seconds)
            } else if e.is_connect() {
                FetchError::Connect(self.summary_url.to_string())
            } else {
                FetchError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body = response.text().await?;
        debug!("Received {} bytes", body.len());

        let summary: Summary = serde_json::from_str(&body)?;
        Ok(summary)
    }
}

/// Join the base URL and endpoint path, tolerating stray slashes.
fn summary_url(base_url: &str, path: &str) -> Result<Url, FetchError> {
    let base = base_url.trim().trim_end_matches('/');

    if !base.starts_with("http://") && !base.starts_with("https://") {
        return Err(FetchError::InvalidUrl(base_url.to_string()));
    }

    let joined = format!("{}/{}", base, path.trim().trim_start_matches('/'));
    Url::parse(&joined).map_err(|_| FetchError::InvalidUrl(joined))
}
