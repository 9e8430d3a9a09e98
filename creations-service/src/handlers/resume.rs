use super::text::generate_text;
use super::upload::UploadForm;
use crate::admission::{run_metered, Produced};
use crate::error::ApiError;
use crate::middleware::Caller;
use crate::models::{ApiResponse, OperationClass};
use crate::services::pdf::extract_text_blocking;
use crate::services::providers::GenerationParams;
use crate::startup::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};

/// Prompt stored with every resume review; the resume text itself is not kept.
pub const RESUME_REVIEW_PROMPT: &str = "Review the uploaded resume";

fn review_prompt(resume_text: &str) -> String {
    format!(
        "Review the following resume and provide constructive feedback on its strengths, \
         weaknesses, and areas for improvement. Resume Content:\n\n{}",
        resume_text
    )
}

fn size_limit_message(max_bytes: usize) -> String {
    format!(
        "Resume file size exceeds allowed size ({}MB).",
        max_bytes / (1024 * 1024)
    )
}

pub async fn review_resume(
    State(state): State<AppState>,
    caller: Caller,
    multipart: Multipart,
) -> Result<Json<ApiResponse>, ApiError> {
    let max_bytes = state.uploads.max_resume_bytes;
    let mut form = UploadForm::read_capped(multipart, &[("resume", max_bytes)]).await?;
    let resume = form
        .take_file("resume")
        .ok_or_else(|| ApiError::validation("Resume is required"))?;

    let params = GenerationParams {
        temperature: Some(state.models.temperature),
        max_tokens: Some(state.models.resume_max_tokens),
    };

    let creation = run_metered(&state, &caller, OperationClass::ResumeReview, || async {
        if resume.len() > max_bytes {
            return Err(ApiError::validation(size_limit_message(max_bytes)));
        }

        let text = extract_text_blocking(resume.bytes).await?;
        let content = generate_text(&state, &review_prompt(&text), params).await?;

        Ok::<_, ApiError>(Produced::new(RESUME_REVIEW_PROMPT, content))
    })
    .await?;

    Ok(Json(ApiResponse::content(creation.content)))
}
