use super::ApiJson;
use crate::admission::{run_metered, Produced};
use crate::dtos::{GenerateArticleRequest, GenerateTitleRequest};
use crate::error::ApiError;
use crate::middleware::Caller;
use crate::models::{ApiResponse, OperationClass};
use crate::services::metrics::observe_provider;
use crate::services::providers::GenerationParams;
use crate::startup::AppState;
use axum::{extract::State, Json};
use validator::Validate;

/// Call the text provider; a response without text yields an empty string.
pub(crate) async fn generate_text(
    state: &AppState,
    prompt: &str,
    params: GenerationParams,
) -> Result<String, ApiError> {
    let provider = state.text_provider.as_ref();
    let response = observe_provider(provider.name(), provider.generate(prompt, &params)).await?;

    tracing::debug!(
        provider = provider.name(),
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        finish_reason = ?response.finish_reason,
        "Text generated"
    );

    Ok(response.text.unwrap_or_default())
}

pub async fn generate_article(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(request): ApiJson<GenerateArticleRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    request.validate()?;
    tracing::debug!(length = ?request.length, "Article requested");

    let params = GenerationParams {
        temperature: Some(state.models.temperature),
        max_tokens: Some(state.models.article_max_tokens),
    };

    let creation = run_metered(&state, &caller, OperationClass::TextGeneration, || async {
        let content = generate_text(&state, &request.prompt, params).await?;
        Ok::<_, ApiError>(Produced::new(request.prompt.as_str(), content))
    })
    .await?;

    Ok(Json(ApiResponse::content(creation.content)))
}

pub async fn generate_blog_title(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(request): ApiJson<GenerateTitleRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    request.validate()?;

    let params = GenerationParams {
        temperature: Some(state.models.temperature),
        max_tokens: Some(state.models.title_max_tokens),
    };

    let creation = run_metered(&state, &caller, OperationClass::TitleGeneration, || async {
        let content = generate_text(&state, &request.prompt, params).await?;
        Ok::<_, ApiError>(Produced::new(request.prompt.as_str(), content))
    })
    .await?;

    Ok(Json(ApiResponse::content(creation.content)))
}
