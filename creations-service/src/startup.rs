use crate::admission::AdmissionPolicy;
use crate::config::{CreationsConfig, ModelConfig, UploadConfig};
use crate::handlers;
use crate::services::providers::clipdrop::{ClipdropConfig, ClipdropImageProvider};
use crate::services::providers::cloudinary::{CloudinaryConfig, CloudinaryMediaStore};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::{ImageProvider, MediaStore, ProviderError, TextProvider};
use crate::services::{CreationStore, Database, EntitlementStore};
use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware,
    routing::{get, post},
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, security_headers_middleware};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub policy: AdmissionPolicy,
    pub models: ModelConfig,
    pub uploads: UploadConfig,
    pub creations: Arc<dyn CreationStore>,
    pub entitlements: Arc<dyn EntitlementStore>,
    pub text_provider: Arc<dyn TextProvider>,
    pub image_provider: Arc<dyn ImageProvider>,
    pub media: Arc<dyn MediaStore>,
}

/// Build the HTTP router over `state`.
pub fn router(state: AppState) -> Router {
    let body_limit = state.uploads.max_request_bytes;

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/api/ai/generate-article", post(handlers::generate_article))
        .route("/api/ai/generate-blog-title", post(handlers::generate_blog_title))
        .route("/api/ai/generate-image", post(handlers::generate_image))
        .route(
            "/api/ai/remove-image-background",
            post(handlers::remove_image_background),
        )
        .route(
            "/api/ai/remove-image-object",
            post(handlers::remove_image_object),
        )
        .route("/api/ai/resume-review", post(handlers::review_resume))
        .route("/api/user/creations", get(handlers::list_user_creations))
        .route(
            "/api/creations/published",
            get(handlers::list_published_creations),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .layer(middleware::from_fn(security_headers_middleware))
        .with_state(state)
}

fn provider_setup_error(e: ProviderError) -> AppError {
    tracing::error!("Failed to initialize provider: {}", e);
    AppError::ConfigError(anyhow::anyhow!("{}", e))
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: CreationsConfig) -> Result<Self, AppError> {
        let db = Database::new(
            config.database.url.expose_secret(),
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to PostgreSQL: {}", e);
            e
        })?;
        db.run_migrations().await?;

        let timeout = Duration::from_secs(config.upstream.timeout_secs);

        let text_provider = GeminiTextProvider::new(GeminiConfig {
            api_key: config.google.api_key.clone(),
            model: config.models.text_model.clone(),
            base_url: config.google.api_base.clone(),
            timeout,
        })
        .map_err(provider_setup_error)?;

        let image_provider = ClipdropImageProvider::new(ClipdropConfig {
            api_key: config.clipdrop.api_key.clone(),
            base_url: config.clipdrop.api_base.clone(),
            timeout,
        })
        .map_err(provider_setup_error)?;

        let media = CloudinaryMediaStore::new(CloudinaryConfig {
            cloud_name: config.cloudinary.cloud_name.clone(),
            api_key: config.cloudinary.api_key.clone(),
            api_secret: config.cloudinary.api_secret.clone(),
            api_base: config.cloudinary.api_base.clone(),
            delivery_base: config.cloudinary.delivery_base.clone(),
            folder: config.cloudinary.folder.clone(),
            signature_algorithm: config.cloudinary.signature_algorithm,
            timeout,
        })
        .map_err(provider_setup_error)?;

        let db = Arc::new(db);
        let state = AppState {
            policy: AdmissionPolicy::new(config.quota.free_usage_limit),
            models: config.models.clone(),
            uploads: config.uploads,
            creations: db.clone(),
            entitlements: db,
            text_provider: Arc::new(text_provider),
            image_provider: Arc::new(image_provider),
            media: Arc::new(media),
        };

        tracing::info!(
            free_usage_limit = state.policy.free_usage_limit(),
            text_model = %state.models.text_model,
            "Creations service configured"
        );

        let app = router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
