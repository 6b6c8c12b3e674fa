//! HTTP helpers: streaming downloads and request/response service calls.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::ToolError;

/// Thin wrapper around a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream `url` into the file at `dest`.
    ///
    /// `timeout` bounds the whole transfer. On any failure the partially
    /// written file is removed so later stages never see a truncated input.
    pub async fn download(&self, url: &str, dest: &Path, timeout: Duration) -> Result<u64, ToolError> {
        let result = self.download_inner(url, dest, timeout).await;
        if result.is_err() {
            let _ = tokio::fs::remove_file(dest).await;
        }
        result
    }

    async fn download_inner(&self, url: &str, dest: &Path, timeout: Duration) -> Result<u64, ToolError> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let response = ensure_success(response).await?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(url, bytes = written, "Download complete");
        Ok(written)
    }

    /// POST a JSON `payload` to `endpoint` and return the raw response body.
    ///
    /// `headers` are added verbatim (used for credentials).
    pub async fn post_json_for_bytes(
        &self,
        endpoint: &str,
        headers: &[(&str, &str)],
        payload: &serde_json::Value,
        timeout: Duration,
    ) -> Result<Vec<u8>, ToolError> {
        let mut request = self.client.post(endpoint).timeout(timeout).json(payload);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = ensure_success(request.send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Return the response unchanged on success, or a [`ToolError::Api`]
/// carrying the status and body text.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ToolError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ToolError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
