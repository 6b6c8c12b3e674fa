//! Client for the remote text-to-sound-effects service.

use std::path::Path;
use std::time::Duration;

use remix_core::prompts::GenerationPrompt;

use crate::config::ToolConfig;
use crate::error::ToolError;
use crate::http::HttpClient;

/// Header carrying the service credential.
const API_KEY_HEADER: &str = "xi-api-key";

/// Generates short audio clips from text prompts.
#[derive(Debug, Clone)]
pub struct SoundEffectsClient {
    http: HttpClient,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl SoundEffectsClient {
    pub fn new(http: HttpClient, endpoint: String, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            http,
            endpoint,
            api_key,
            timeout,
        }
    }

    pub fn from_config(http: HttpClient, config: &ToolConfig) -> Self {
        Self::new(
            http,
            config.generation_endpoint.clone(),
            config.generation_api_key.clone(),
            config.generation_timeout,
        )
    }

    /// Request a clip for `prompt` and write the returned audio to `output`.
    ///
    /// A missing credential is reported here, on first use, rather than at
    /// startup.
    pub async fn generate(&self, prompt: &GenerationPrompt, output: &Path) -> Result<u64, ToolError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ToolError::Configuration("ELEVENLABS_API_KEY".into()))?;

        let payload = serde_json::json!({
            "text": prompt.text,
            "duration_seconds": prompt.duration_secs,
        });

        let bytes = self
            .http
            .post_json_for_bytes(&self.endpoint, &[(API_KEY_HEADER, api_key)], &payload, self.timeout)
            .await?;
        tokio::fs::write(output, &bytes).await?;

        tracing::debug!(bytes = bytes.len(), duration_secs = prompt.duration_secs, "Generated clip");
        Ok(bytes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn prompt() -> GenerationPrompt {
        GenerationPrompt {
            text: "Create a short EDM FX riser for dusk.".into(),
            duration_secs: 4,
        }
    }

    #[tokio::test]
    async fn writes_generated_audio() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("xi-api-key", "k-123"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 32]))
            .mount(&server)
            .await;

        let client = SoundEffectsClient::new(
            HttpClient::new(),
            server.uri(),
            Some("k-123".into()),
            Duration::from_secs(5),
        );
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("fx.mp3");

        assert_eq!(client.generate(&prompt(), &out).await.unwrap(), 32);
        assert_eq!(std::fs::read(out).unwrap().len(), 32);
    }

    #[tokio::test]
    async fn server_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let client = SoundEffectsClient::new(
            HttpClient::new(),
            server.uri(),
            Some("k".into()),
            Duration::from_secs(5),
        );
        let dir = tempfile::tempdir().unwrap();
        let err = client
            .generate(&prompt(), &dir.path().join("fx.mp3"))
            .await
            .unwrap_err();

        assert_matches!(err, ToolError::Api { status: 500, .. });
    }

    #[tokio::test]
    async fn missing_key_is_configuration_error() {
        let client = SoundEffectsClient::new(
            HttpClient::new(),
            "http://127.0.0.1:9".into(),
            None,
            Duration::from_secs(1),
        );
        let err = client
            .generate(&prompt(), Path::new("/tmp/unused.mp3"))
            .await
            .unwrap_err();
        assert_matches!(err, ToolError::Configuration(_));
    }
}
