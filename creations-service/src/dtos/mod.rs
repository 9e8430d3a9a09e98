pub mod creations;
pub mod generation;

pub use creations::ListParams;
pub use generation::{GenerateArticleRequest, GenerateImageRequest, GenerateTitleRequest};
