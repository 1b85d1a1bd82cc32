//! Summary snapshots stored on disk.

use crate::fetch::FetchError;
use crate::models::Summary;
use std::path::Path;
use tracing::info;

/// Read a summary saved as JSON (the same shape the API returns).
pub async fn load_snapshot(path: &Path) -> Result<Summary, FetchError> {
    info!("Reading summary snapshot: {}", path.display());

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(serde_json::from_str(&content)?)
}
