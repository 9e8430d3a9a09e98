use super::ApiQuery;
use crate::dtos::ListParams;
use crate::error::ApiError;
use crate::middleware::Caller;
use crate::models::CreationsResponse;
use crate::startup::AppState;
use axum::{extract::State, Json};

pub async fn list_user_creations(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<CreationsResponse>, ApiError> {
    let creations = state
        .creations
        .list_for_user(&caller.user_id, params.limit())
        .await?;

    Ok(Json(creations.into()))
}

pub async fn list_published_creations(
    State(state): State<AppState>,
    _caller: Caller,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<CreationsResponse>, ApiError> {
    let creations = state.creations.list_published(params.limit()).await?;

    Ok(Json(creations.into()))
}
