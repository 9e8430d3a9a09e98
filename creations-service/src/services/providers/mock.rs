//! Mock provider implementations for testing.
//!
//! Each mock counts its calls so tests can assert that an upstream was, or
//! was not, reached.

use super::{
    FinishReason, GeneratedImage, GenerationParams, ImageProvider, MediaStore, MediaUpload,
    ProviderError, ProviderResponse, TextProvider, Transformation, UploadedAsset,
};
use super::cloudinary::transformation_component;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// How a mock answers.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Answer normally.
    Succeed,
    /// Answer with no content.
    Empty,
    /// Fail with an API error.
    Fail,
}

/// Mock text provider for testing.
pub struct MockTextProvider {
    behavior: MockBehavior,
    calls: AtomicUsize,
    last_params: Mutex<Option<GenerationParams>>,
    last_prompt: Mutex<Option<String>>,
}

impl MockTextProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_params: Mutex::new(None),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> Option<GenerationParams> {
        *self.last_params.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MockTextProvider {
    fn default() -> Self {
        Self::new(MockBehavior::Succeed)
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap_or_else(|e| e.into_inner()) = Some(*params);
        *self.last_prompt.lock().unwrap_or_else(|e| e.into_inner()) = Some(prompt.to_string());

        let text = match self.behavior {
            MockBehavior::Succeed => Some(format!("Mock response for: {}", prompt)),
            MockBehavior::Empty => None,
            MockBehavior::Fail => {
                return Err(ProviderError::ApiError("mock text failure".to_string()))
            }
        };

        Ok(ProviderResponse {
            text,
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: 10,
            finish_reason: FinishReason::Complete,
        })
    }

    fn name(&self) -> &'static str {
        "mock-text"
    }
}

/// Mock text-to-image provider for testing.
pub struct MockImageProvider {
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockImageProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockImageProvider {
    fn default() -> Self {
        Self::new(MockBehavior::Succeed)
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    async fn generate(&self, _prompt: &str) -> Result<GeneratedImage, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            MockBehavior::Succeed => Ok(GeneratedImage {
                // PNG signature is enough for anything downstream of us.
                bytes: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
                mime_type: "image/png".to_string(),
            }),
            MockBehavior::Empty => Ok(GeneratedImage {
                bytes: Vec::new(),
                mime_type: "image/png".to_string(),
            }),
            MockBehavior::Fail => Err(ProviderError::ApiError("mock image failure".to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "mock-image"
    }
}

/// Mock media store for testing. Records every upload.
pub struct MockMediaStore {
    behavior: MockBehavior,
    uploads: Mutex<Vec<(MediaUpload, Option<Transformation>)>>,
}

impl MockMediaStore {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.uploads.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn uploads(&self) -> Vec<(MediaUpload, Option<Transformation>)> {
        self.uploads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MockMediaStore {
    fn default() -> Self {
        Self::new(MockBehavior::Succeed)
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn upload(
        &self,
        upload: MediaUpload,
        transformation: Option<Transformation>,
    ) -> Result<UploadedAsset, ProviderError> {
        let index = {
            let mut uploads = self.uploads.lock().unwrap_or_else(|e| e.into_inner());
            uploads.push((upload, transformation));
            uploads.len()
        };

        match self.behavior {
            MockBehavior::Succeed => {
                let public_id = format!("mock/asset-{}", index);
                Ok(UploadedAsset {
                    secure_url: format!("https://media.test/{}.png", public_id),
                    public_id,
                })
            }
            MockBehavior::Empty => Ok(UploadedAsset {
                public_id: format!("mock/asset-{}", index),
                secure_url: String::new(),
            }),
            MockBehavior::Fail => Err(ProviderError::ApiError("mock upload failure".to_string())),
        }
    }

    fn derived_url(&self, public_id: &str, transformations: &[Transformation]) -> String {
        let mut url = "https://media.test".to_string();
        for t in transformations {
            url.push('/');
            url.push_str(&transformation_component(t));
        }
        format!("{}/{}", url, public_id)
    }

    fn name(&self) -> &'static str {
        "mock-media"
    }
}
