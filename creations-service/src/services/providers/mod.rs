//! Upstream provider abstractions and implementations.
//!
//! Each external service the handlers call sits behind a trait so the
//! backends (Gemini, Clipdrop, Cloudinary, mocks) can be swapped freely.

pub mod clipdrop;
pub mod cloudinary;
pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Short label used for the error metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "not_configured",
            Self::ApiError(_) => "api_error",
            Self::InvalidRequest(_) => "invalid_request",
            Self::RateLimited => "rate_limited",
            Self::ContentFiltered => "content_filtered",
            Self::NetworkError(_) => "network_error",
        }
    }
}

/// Result of a text generation call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Generated text, if the model produced any.
    pub text: Option<String>,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
}

/// Generation parameters for text requests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationParams {
    /// Temperature (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Maximum output tokens.
    pub max_tokens: Option<i32>,
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Identifier used in logs and metrics.
    fn name(&self) -> &'static str;
}

/// A generated image.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Trait for text-to-image providers (e.g., Clipdrop).
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ProviderError>;

    fn name(&self) -> &'static str;
}

/// An image handed to the media store.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

/// An asset stored by the media store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub public_id: String,
    pub secure_url: String,
}

/// Image transformations supported by the media store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformation {
    /// Strip the background, leaving the subject.
    RemoveBackground,
    /// Generatively erase the named object.
    RemoveObject { object: String },
    /// Scale proportionally to the given width.
    ScaleToWidth(u32),
}

/// Trait for media asset services (e.g., Cloudinary).
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload an image, applying `transformation` as an incoming transformation.
    async fn upload(
        &self,
        upload: MediaUpload,
        transformation: Option<Transformation>,
    ) -> Result<UploadedAsset, ProviderError>;

    /// URL of a derived asset with the chained transformations applied on delivery.
    fn derived_url(&self, public_id: &str, transformations: &[Transformation]) -> String;

    fn name(&self) -> &'static str;
}

/// HTTP client shared by the provider implementations.
pub(crate) fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a non-success upstream response into a `ProviderError`.
pub(crate) async fn error_for_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();

    if status.as_u16() == 429 {
        return Err(ProviderError::RateLimited);
    }
    if status.is_client_error() {
        return Err(ProviderError::InvalidRequest(format!(
            "{} rejected request {}: {}",
            provider, status, error_text
        )));
    }

    Err(ProviderError::ApiError(format!(
        "{} API error {}: {}",
        provider, status, error_text
    )))
}
