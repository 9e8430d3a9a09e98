use serde::{Deserialize, Deserializer};
use validator::Validate;

/// Treat a missing, null or whitespace-only string as empty.
fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()).unwrap_or_default())
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateArticleRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Prompt is required"))]
    pub prompt: String,
    /// Requested length in words; the prompt already carries it.
    #[serde(default)]
    pub length: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateTitleRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Prompt is required"))]
    pub prompt: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateImageRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Prompt is required"))]
    pub prompt: String,
    #[serde(default)]
    pub publish: bool,
}
