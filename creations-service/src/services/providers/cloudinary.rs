//! Cloudinary media store.
//!
//! Uploads go through the signed Upload API. Signatures default to SHA-1,
//! which every account accepts; SHA-256 works only on accounts that have
//! SHA-256 API signatures enabled.

use super::{
    error_for_status, http_client, MediaStore, MediaUpload, ProviderError, Transformation,
    UploadedAsset,
};
use async_trait::async_trait;
use reqwest::{multipart, Client};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::observability::TracedClientExt;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com";
pub const CLOUDINARY_DELIVERY_BASE: &str = "https://res.cloudinary.com";

/// Digest used for upload signatures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            other => Err(format!("unknown signature algorithm '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: Secret<String>,
    pub api_base: String,
    pub delivery_base: String,
    /// Folder uploads land in, if any.
    pub folder: Option<String>,
    pub signature_algorithm: SignatureAlgorithm,
    pub timeout: Duration,
}

pub struct CloudinaryMediaStore {
    config: CloudinaryConfig,
    client: Client,
}

impl CloudinaryMediaStore {
    pub fn new(config: CloudinaryConfig) -> Result<Self, ProviderError> {
        if config.cloud_name.is_empty()
            || config.api_key.is_empty()
            || config.api_secret.expose_secret().is_empty()
        {
            return Err(ProviderError::NotConfigured(
                "Cloudinary credentials not configured".to_string(),
            ));
        }
        let client = http_client(config.timeout)?;
        Ok(Self { config, client })
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }
}

/// Render one transformation as a URL / upload-parameter component.
pub fn transformation_component(transformation: &Transformation) -> String {
    match transformation {
        Transformation::RemoveBackground => "e_background_removal".to_string(),
        Transformation::RemoveObject { object } => {
            format!("e_gen_remove:prompt_{}", object.trim().replace(' ', "%20"))
        }
        Transformation::ScaleToWidth(width) => format!("c_scale,w_{}", width),
    }
}

/// Signature over the sorted, `&`-joined parameters followed by the secret.
fn sign(
    params: &BTreeMap<&str, String>,
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    match algorithm {
        SignatureAlgorithm::Sha1 => hex_digest::<Sha1>(&to_sign, api_secret),
        SignatureAlgorithm::Sha256 => hex_digest::<Sha256>(&to_sign, api_secret),
    }
}

fn hex_digest<D: Digest>(to_sign: &str, api_secret: &str) -> String {
    let mut hasher = D::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn upload(
        &self,
        upload: MediaUpload,
        transformation: Option<Transformation>,
    ) -> Result<UploadedAsset, ProviderError> {
        let mut params: BTreeMap<&'static str, String> = BTreeMap::new();
        params.insert("timestamp", chrono::Utc::now().timestamp().to_string());
        if let Some(t) = &transformation {
            params.insert("transformation", transformation_component(t));
        }
        if let Some(folder) = &self.config.folder {
            params.insert("folder", folder.clone());
        }

        let signature = sign(
            &params,
            self.config.api_secret.expose_secret(),
            self.config.signature_algorithm,
        );

        let file_part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime_type)
            .map_err(|e| ProviderError::InvalidRequest(format!("Invalid MIME type: {}", e)))?;

        let mut form = multipart::Form::new()
            .part("file", file_part)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        tracing::debug!(
            transformation = ?transformation,
            "Uploading image to Cloudinary"
        );

        let response = self
            .client
            .traced_post(&self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let response = error_for_status("Cloudinary", response).await?;

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        Ok(UploadedAsset {
            public_id: body.public_id,
            secure_url: body.secure_url,
        })
    }

    fn derived_url(&self, public_id: &str, transformations: &[Transformation]) -> String {
        let mut segments = vec![
            self.config.delivery_base.trim_end_matches('/').to_string(),
            self.config.cloud_name.clone(),
            "image".to_string(),
            "upload".to_string(),
        ];
        segments.extend(transformations.iter().map(transformation_component));
        segments.push(public_id.to_string());
        segments.join("/")
    }

    fn name(&self) -> &'static str {
        "cloudinary"
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}
