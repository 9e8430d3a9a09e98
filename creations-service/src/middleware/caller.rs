use crate::error::ApiError;
use crate::models::Subscriber;
use crate::startup::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header carrying the authenticated user id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "X-User-ID";

/// The authenticated caller and their subscriber snapshot.
///
/// Trust in `X-User-ID` is delegated to the gateway in front of the
/// service. The snapshot is read once per request and is what admission
/// decides on; unknown users are registered as free on first sight.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub subscriber: Subscriber,
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?
            .to_string();

        tracing::Span::current().record("user_id", user_id.as_str());

        let subscriber = state.entitlements.subscriber(&user_id).await?;

        Ok(Caller {
            user_id,
            subscriber,
        })
    }
}
