//! Route handlers.

use super::{ApiError, AppState};
use crate::extraction::{UploadedDocument, extract_best_effort};
use crate::pipeline::SubmitTaskRequest;
use crate::task::{
    domain::TaskId,
    ports::TaskRepository,
    services::{TaskResultView, TaskStatusView},
};
use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const ACCEPTED_MESSAGE: &str = "task created and running";
const DEFAULT_UPLOAD_NAME: &str = "upload";

/// Body of `POST /api/cabinet/run`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// Free-text request.
    #[serde(default)]
    pub text: String,
    /// Text already extracted from a document by the client.
    #[serde(default)]
    pub ocr_result: Option<String>,
}

/// Response to a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAccepted {
    /// Identifier to poll.
    pub task_id: TaskId,
    /// Confirmation message.
    pub message: String,
}

#[expect(clippy::unused_async, reason = "axum handlers are async functions")]
pub(super) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(super) async fn run<R, C>(
    State(state): State<AppState<R, C>>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Result<Json<RunAccepted>, ApiError>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    submit(
        &state,
        SubmitTaskRequest::new(request.text).with_document(request.ocr_result),
    )
    .await
}

pub(super) async fn run_upload<R, C>(
    State(state): State<AppState<R, C>>,
    upload: Result<Multipart, MultipartRejection>,
) -> Result<Json<RunAccepted>, ApiError>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut form = upload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let mut text = String::new();
    let mut document = None;
    while let Some(field) = form.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("text") => text = field.text().await?,
            Some("file") => {
                let file_name = field.file_name().unwrap_or(DEFAULT_UPLOAD_NAME).to_owned();
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await?;
                document = Some(UploadedDocument {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let extracted = match &document {
        Some(file) => extract_best_effort(state.extractor.as_ref(), file).await,
        None => None,
    };
    submit(&state, SubmitTaskRequest::new(text).with_document(extracted)).await
}

pub(super) async fn status<R, C>(
    State(state): State<AppState<R, C>>,
    Path(raw_id): Path<String>,
) -> Result<Json<TaskStatusView>, ApiError>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let id = parse_task_id(&raw_id)?;
    Ok(Json(state.projector.status(id).await?))
}

pub(super) async fn result<R, C>(
    State(state): State<AppState<R, C>>,
    Path(raw_id): Path<String>,
) -> Result<Json<TaskResultView>, ApiError>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let id = parse_task_id(&raw_id)?;
    Ok(Json(state.projector.result(id).await?))
}

async fn submit<R, C>(
    state: &AppState<R, C>,
    request: SubmitTaskRequest,
) -> Result<Json<RunAccepted>, ApiError>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let handle = state.pipeline.submit(request).await?;
    Ok(Json(RunAccepted {
        task_id: handle.task_id(),
        message: ACCEPTED_MESSAGE.to_owned(),
    }))
}

fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map(TaskId::new)
        .map_err(|_| ApiError::BadRequest(format!("task id must be numeric, got {raw:?}")))
}
