//! Clipdrop text-to-image provider.

use super::{error_for_status, http_client, GeneratedImage, ImageProvider, ProviderError};
use async_trait::async_trait;
use reqwest::{multipart, Client};
use secrecy::{ExposeSecret, Secret};
use service_core::observability::TracedClientExt;
use std::time::Duration;

pub const CLIPDROP_API_BASE: &str = "https://clipdrop-api.co";

/// Clipdrop caps prompts at this many characters.
const MAX_PROMPT_CHARS: usize = 1000;

#[derive(Debug, Clone)]
pub struct ClipdropConfig {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub timeout: Duration,
}

pub struct ClipdropImageProvider {
    config: ClipdropConfig,
    client: Client,
}

impl ClipdropImageProvider {
    pub fn new(config: ClipdropConfig) -> Result<Self, ProviderError> {
        if config.api_key.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Clipdrop API key not configured".to_string(),
            ));
        }
        let client = http_client(config.timeout)?;
        Ok(Self { config, client })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/text-to-image/v1",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ImageProvider for ClipdropImageProvider {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ProviderError> {
        if prompt.chars().count() > MAX_PROMPT_CHARS {
            return Err(ProviderError::InvalidRequest(format!(
                "Prompt exceeds {} characters",
                MAX_PROMPT_CHARS
            )));
        }

        tracing::debug!(prompt_len = prompt.len(), "Sending request to Clipdrop API");

        let form = multipart::Form::new().text("prompt", prompt.to_string());

        let response = self
            .client
            .traced_post(&self.api_url())
            .header("x-api-key", self.config.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let response = error_for_status("Clipdrop", response).await?;

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if bytes.is_empty() {
            return Err(ProviderError::ApiError(
                "Clipdrop returned an empty image".to_string(),
            ));
        }

        Ok(GeneratedImage {
            bytes: bytes.to_vec(),
            mime_type,
        })
    }

    fn name(&self) -> &'static str {
        "clipdrop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> ClipdropImageProvider {
        ClipdropImageProvider::new(ClipdropConfig {
            api_key: Secret::new("key".to_string()),
            base_url: "https://clipdrop.test/".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn url_has_no_double_slash() {
        assert_eq!(provider().api_url(), "https://clipdrop.test/text-to-image/v1");
    }

    #[tokio::test]
    async fn overlong_prompt_is_rejected_before_sending() {
        let prompt = "a".repeat(MAX_PROMPT_CHARS + 1);
        let err = provider().generate(&prompt).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRequest(_)));
    }
}
