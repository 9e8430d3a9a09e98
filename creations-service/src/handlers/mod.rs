pub mod creations;
pub mod health;
pub mod image;
pub mod resume;
pub mod text;
pub mod upload;

use crate::error::ApiError;
use axum::extract::{FromRequest, FromRequestParts};

pub use creations::{list_published_creations, list_user_creations};
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use image::{generate_image, remove_image_background, remove_image_object};
pub use resume::review_resume;
pub use text::{generate_article, generate_blog_title};

/// `Json` whose rejections use the service envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejections use the service envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
