use super::upload::UploadForm;
use super::ApiJson;
use crate::admission::{run_metered, Produced};
use crate::dtos::GenerateImageRequest;
use crate::error::ApiError;
use crate::middleware::Caller;
use crate::models::{ApiResponse, OperationClass};
use crate::services::metrics::observe_provider;
use crate::services::providers::{MediaUpload, Transformation};
use crate::startup::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use validator::Validate;

/// Width derived images are scaled to after object removal.
const OBJECT_REMOVAL_WIDTH: u32 = 800;

const IMAGE_REQUIRED: &str = "Image is required";

/// Object names end up inside a delivery URL, so only plain words pass.
fn validate_object_name(object: &str) -> Result<(), ApiError> {
    let valid = object
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(ApiError::validation(
            "Object may only contain letters, digits, spaces, '-' and '_'",
        ))
    }
}

pub async fn generate_image(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(request): ApiJson<GenerateImageRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    request.validate()?;

    let creation = run_metered(&state, &caller, OperationClass::ImageGeneration, || async {
        let images = state.image_provider.as_ref();
        let image = observe_provider(images.name(), images.generate(&request.prompt)).await?;

        let media = state.media.as_ref();
        let upload = MediaUpload {
            bytes: image.bytes,
            file_name: "generated.png".to_string(),
            mime_type: image.mime_type,
        };
        let asset = observe_provider(media.name(), media.upload(upload, None)).await?;

        let produced = Produced::new(request.prompt.as_str(), asset.secure_url);
        Ok::<_, ApiError>(produced.published(request.publish))
    })
    .await?;

    Ok(Json(ApiResponse::content(creation.content)))
}

pub async fn remove_image_background(
    State(state): State<AppState>,
    caller: Caller,
    multipart: Multipart,
) -> Result<Json<ApiResponse>, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let image = form
        .take_file("image")
        .ok_or_else(|| ApiError::validation(IMAGE_REQUIRED))?;

    let creation = run_metered(&state, &caller, OperationClass::BackgroundRemoval, || async {
        let media = state.media.as_ref();
        let asset = observe_provider(
            media.name(),
            media.upload(image.into(), Some(Transformation::RemoveBackground)),
        )
        .await?;

        Ok::<_, ApiError>(Produced::new("Remove background from image", asset.secure_url))
    })
    .await?;

    Ok(Json(ApiResponse::content(creation.content)))
}

pub async fn remove_image_object(
    State(state): State<AppState>,
    caller: Caller,
    multipart: Multipart,
) -> Result<Json<ApiResponse>, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let image = form
        .take_file("image")
        .ok_or_else(|| ApiError::validation(IMAGE_REQUIRED))?;
    let object = form
        .text("object")
        .ok_or_else(|| ApiError::validation("Object is required"))?
        .to_string();
    validate_object_name(&object)?;

    let creation = run_metered(&state, &caller, OperationClass::ObjectRemoval, || async {
        let media = state.media.as_ref();
        let asset = observe_provider(media.name(), media.upload(image.into(), None)).await?;

        let url = media.derived_url(
            &asset.public_id,
            &[
                Transformation::RemoveObject {
                    object: object.clone(),
                },
                Transformation::ScaleToWidth(OBJECT_REMOVAL_WIDTH),
            ],
        );

        Ok::<_, ApiError>(Produced::new(format!("Remove {} from image", object), url))
    })
    .await?;

    Ok(Json(ApiResponse::content(creation.content)))
}
