#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use creations_service::admission::AdmissionPolicy;
use creations_service::config::{ModelConfig, UploadConfig};
use creations_service::models::Tier;
use creations_service::services::providers::mock::{
    MockBehavior, MockImageProvider, MockMediaStore, MockTextProvider,
};
use creations_service::services::{InMemoryCreations, InMemoryEntitlements};
use creations_service::startup::{router, AppState};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const BOUNDARY: &str = "creations-test-boundary";

/// Router over in-memory stores and mock upstreams, with handles to each.
pub struct TestApp {
    pub router: Router,
    pub creations: Arc<InMemoryCreations>,
    pub entitlements: Arc<InMemoryEntitlements>,
    pub text: Arc<MockTextProvider>,
    pub images: Arc<MockImageProvider>,
    pub media: Arc<MockMediaStore>,
}

pub struct TestAppBuilder {
    entitlements: InMemoryEntitlements,
    text: MockBehavior,
    images: MockBehavior,
    media: MockBehavior,
    uploads: UploadConfig,
}

impl TestAppBuilder {
    pub fn subscriber(mut self, user_id: &str, tier: Tier, free_usage: i32) -> Self {
        self.entitlements = self
            .entitlements
            .with_subscriber(user_id, tier, free_usage);
        self
    }

    pub fn failing_increments(mut self) -> Self {
        self.entitlements = self.entitlements.failing_increments();
        self
    }

    pub fn text(mut self, behavior: MockBehavior) -> Self {
        self.text = behavior;
        self
    }

    pub fn media(mut self, behavior: MockBehavior) -> Self {
        self.media = behavior;
        self
    }

    pub fn max_resume_bytes(mut self, bytes: usize) -> Self {
        self.uploads.max_resume_bytes = bytes;
        self
    }

    pub fn build(self) -> TestApp {
        let creations = Arc::new(InMemoryCreations::new());
        let entitlements = Arc::new(self.entitlements);
        let text = Arc::new(MockTextProvider::new(self.text));
        let images = Arc::new(MockImageProvider::new(self.images));
        let media = Arc::new(MockMediaStore::new(self.media));

        let state = AppState {
            policy: AdmissionPolicy::default(),
            models: ModelConfig::default(),
            uploads: self.uploads,
            creations: creations.clone(),
            entitlements: entitlements.clone(),
            text_provider: text.clone(),
            image_provider: images.clone(),
            media: media.clone(),
        };

        TestApp {
            router: router(state),
            creations,
            entitlements,
            text,
            images,
            media,
        }
    }
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder {
            entitlements: InMemoryEntitlements::new(),
            text: MockBehavior::Succeed,
            images: MockBehavior::Succeed,
            media: MockBehavior::Succeed,
            uploads: UploadConfig::default(),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn post_json(&self, uri: &str, user_id: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .header("x-user-id", user_id)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        user_id: &str,
        parts: &[Part<'_>],
    ) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .header("x-user-id", user_id)
                .body(Body::from(multipart_body(parts)))
                .unwrap(),
        )
        .await
    }

    pub async fn get(&self, uri: &str, user_id: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .uri(uri)
                .header("x-user-id", user_id)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

/// One multipart part.
pub enum Part<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}",
                        name, value
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// A one-page PDF showing `text`.
pub fn pdf_with_text(text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
