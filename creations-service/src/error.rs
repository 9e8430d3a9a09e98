//! Handler-boundary errors.
//!
//! Every failure a handler can produce is converted here into the
//! `{success: false, message}` envelope and logged once.

use crate::admission::policy::DenialReason;
use crate::models::ApiResponse;
use crate::services::pdf::PdfError;
use crate::services::providers::ProviderError;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;
use thiserror::Error;

/// Message returned when an upstream answered without usable content.
pub const EMPTY_CONTENT_MESSAGE: &str = "AI did not return any content. Try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{}", .0.message())]
    EntitlementDenied(DenialReason),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn empty_content() -> Self {
        Self::Upstream(EMPTY_CONTENT_MESSAGE.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::EntitlementDenied(_) => StatusCode::FORBIDDEN,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        ApiError::Upstream(format!("Internal server error: {}", err))
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(e) => ApiError::Validation(e.to_string()),
            AppError::ValidationError(e) => ApiError::Validation(e.to_string()),
            AppError::Unauthorized(e) => ApiError::Unauthorized(e.to_string()),
            other => ApiError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Surface the first field message; fields carry caller-facing text.
        let message = errors
            .field_errors()
            .into_values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());
        ApiError::Validation(message)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(format!("Invalid query: {}", rejection.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge(
                "Upload exceeds the maximum request size".to_string(),
            );
        }
        ApiError::Validation(format!("Invalid upload: {}", err.body_text()))
    }
}

impl From<PdfError> for ApiError {
    fn from(err: PdfError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ApiError::Upstream(_) | ApiError::Internal(_) => {
                tracing::error!(status = status.as_u16(), error = %self, "Request failed");
            }
            _ => {
                tracing::info!(status = status.as_u16(), error = %self, "Request rejected");
            }
        }

        let message = match &self {
            ApiError::Internal(err) => format!("Internal server error: {}", err),
            other => other.to_string(),
        };

        (status, Json(ApiResponse::failure(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn denial_maps_to_403_with_reason_message() {
        let (status, body) = body_of(ApiError::EntitlementDenied(DenialReason::LimitReached)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Limit reached. Upgrade to continue.");
    }

    #[tokio::test]
    async fn provider_failure_maps_to_500() {
        let (status, body) = body_of(ProviderError::RateLimited.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error: Rate limited");
    }

    #[tokio::test]
    async fn oversized_body_maps_to_413() {
        let (status, body) = body_of(ApiError::PayloadTooLarge(
            "Upload exceeds the maximum request size".into(),
        ))
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Upload exceeds the maximum request size");
    }

    #[tokio::test]
    async fn database_errors_become_internal() {
        let err = ApiError::from(AppError::DatabaseError(anyhow::anyhow!("connection reset")));
        assert!(matches!(err, ApiError::Internal(_)));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Internal server error"));
    }

    #[test]
    fn validation_message_is_surfaced() {
        #[derive(validator::Validate)]
        struct Input {
            #[validate(length(min = 1, message = "Prompt is required"))]
            prompt: String,
        }

        let errors = validator::Validate::validate(&Input {
            prompt: String::new(),
        })
        .unwrap_err();
        let err = ApiError::from(errors);
        assert_eq!(err.to_string(), "Prompt is required");
    }
}
