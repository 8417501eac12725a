//! Object storage delivery (S3-compatible HTTP PUT)

use crate::{Error, Result};
use std::path::Path;
use std::time::Duration;

/// Object storage client bound to an endpoint and bucket
pub struct ObjectStore {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
}

impl ObjectStore {
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            endpoint: endpoint.into(),
            bucket: bucket.into(),
        }
    }

    /// Upload a local file under the given key, with server-side
    /// encryption enabled
    pub async fn put_object(&self, local: &Path, key: &str) -> Result<()> {
        let data = tokio::fs::read(local).await?;
        let url = format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.bucket,
            key
        );
        tracing::info!(url = %url, size = data.len(), "Uploading to object storage");

        let resp = self
            .client
            .put(&url)
            .header("x-amz-server-side-encryption", "AES256")
            .body(data)
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Error::Api(format!(
                "storage upload failed with status {}",
                resp.status()
            )))
        }
    }
}
