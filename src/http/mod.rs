//! HTTP surface: submit a request, poll its status, fetch its result.
//!
//! Handlers are thin; every decision lives in the pipeline and task
//! services.

mod error;
mod handlers;

pub use error::{ApiError, ErrorBody};
pub use handlers::{RunAccepted, RunRequest};

use crate::config::ServerConfig;
use crate::extraction::DocumentExtractor;
use crate::pipeline::PipelineService;
use crate::task::{ports::TaskRepository, services::ResultProjector};
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode, header};
use axum::routing::{get, post};
use axum::Router;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Shared handler state.
pub struct AppState<R, C>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Orchestrator used for submissions.
    pub pipeline: PipelineService<R, C>,
    /// Read side for status and result queries.
    pub projector: ResultProjector<R>,
    /// Extractor applied to uploaded files.
    pub extractor: Arc<dyn DocumentExtractor>,
}

impl<R, C> Clone for AppState<R, C>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            projector: self.projector.clone(),
            extractor: Arc::clone(&self.extractor),
        }
    }
}

/// Builds the application router with CORS, body-size and timeout layers.
pub fn router<R, C>(state: AppState<R, C>, config: &ServerConfig) -> Router
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/cabinet/run", post(handlers::run::<R, C>))
        .route("/api/cabinet/run-upload", post(handlers::run_upload::<R, C>))
        .route("/api/cabinet/status/{id}", get(handlers::status::<R, C>))
        .route("/api/cabinet/result/{id}", get(handlers::result::<R, C>))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout(),
        ))
}
