//! JSON envelopes returned by the HTTP surface.

use super::creation::Creation;
use serde::{Deserialize, Serialize};

/// `{success, content?, message?}` body shared by every generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: Some(content.into()),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            message: Some(message.into()),
        }
    }
}

/// Listing body for creation queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreationsResponse {
    pub success: bool,
    pub creations: Vec<Creation>,
}

impl From<Vec<Creation>> for CreationsResponse {
    fn from(creations: Vec<Creation>) -> Self {
        Self {
            success: true,
            creations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_omits_content() {
        let body = serde_json::to_value(ApiResponse::failure("Prompt is required")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "message": "Prompt is required"})
        );
    }

    #[test]
    fn success_omits_message() {
        let body = serde_json::to_value(ApiResponse::content("hello")).unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "content": "hello"}));
    }
}
