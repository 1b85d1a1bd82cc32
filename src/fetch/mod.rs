//! Loading the summary snapshot.
//!
//! The summary comes either from the reports API or from a JSON file saved
//! earlier. Both paths produce the same [`Summary`] and share one error type.

pub mod api;
pub mod snapshot;

pub use api::ApiClient;

use crate::models::Summary;
use std::path::PathBuf;

/// Errors raised while loading a summary.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to {0}. Is the API server running?")]
    Connect(String),

    #[error("API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode summary: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the summary is loaded from.
pub enum SummarySource {
    Api(ApiClient),
    File(PathBuf),
}

impl SummarySource {
    /// Human-readable location, for logs and report metadata.
    pub fn describe(&self) -> String {
        match self {
            SummarySource::Api(client) => client.summary_url().to_string(),
            SummarySource::File(path) => path.display().to_string(),
        }
    }

    /// Load the summary from this source.
    pub async fn load(&self) -> Result<Summary, FetchError> {
        match self {
            SummarySource::Api(client) => client.fetch_summary().await,
            SummarySource::File(path) => snapshot::load_snapshot(path).await,
        }
    }
}
