//! Status and result views derived from stored tasks.

use crate::task::{
    domain::{PipelineStage, Task, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned while projecting task views.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// No task exists with the requested identifier.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// Repository lookup failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

/// Lightweight progress view for polling clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusView {
    /// Task identifier.
    pub task_id: TaskId,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// Progress percentage derived from the status.
    pub progress: u8,
    /// Review rounds counter.
    pub retry_count: u32,
    /// Planner output, once available.
    pub planning_result: Option<String>,
    /// Latest Executor output, once available.
    pub execution_result: Option<String>,
    /// Latest Reviewer output, once available.
    pub review_result: Option<String>,
    /// Failure explanation for failed tasks.
    pub fail_reason: Option<String>,
    /// Stage that failed.
    pub fail_step: Option<PipelineStage>,
}

/// Full result view including the derived skill configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResultView {
    /// Task identifier.
    pub task_id: TaskId,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// Progress percentage derived from the status.
    pub progress: u8,
    /// Original request.
    pub user_input: String,
    /// Planner output.
    pub planning_result: Option<String>,
    /// Latest Executor output.
    pub execution_result: Option<String>,
    /// Latest Reviewer output.
    pub review_result: Option<String>,
    /// Finalizer summary.
    pub final_result: Option<String>,
    /// Reusable template.
    pub template: Option<String>,
    /// First fenced YAML block found in the summary or template.
    pub skill_config: Option<String>,
    /// Review rounds counter.
    pub retry_count: u32,
    /// Whether the result was produced without a passing review.
    pub provisional: bool,
    /// Failure explanation for failed tasks.
    pub fail_reason: Option<String>,
    /// Stage that failed.
    pub fail_step: Option<PipelineStage>,
    /// Wall-clock time from creation to the terminal update; `None` while
    /// the pipeline is still running.
    pub elapsed_ms: Option<i64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskStatusView {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id(),
            status: task.status(),
            progress: task.status().progress_percent(),
            retry_count: task.retry_count(),
            planning_result: task.planning_result().map(str::to_owned),
            execution_result: task.execution_result().map(str::to_owned),
            review_result: task.review_result().map(str::to_owned),
            fail_reason: task.fail_reason().map(str::to_owned),
            fail_step: task.fail_step(),
        }
    }
}

impl From<&Task> for TaskResultView {
    fn from(task: &Task) -> Self {
        let skill_config = task
            .final_result()
            .and_then(extract_skill_config)
            .or_else(|| task.template().and_then(extract_skill_config));
        let elapsed_ms = task
            .status()
            .is_terminal()
            .then(|| (task.updated_at() - task.created_at()).num_milliseconds());

        Self {
            task_id: task.id(),
            status: task.status(),
            progress: task.status().progress_percent(),
            user_input: task.user_input().to_owned(),
            planning_result: task.planning_result().map(str::to_owned),
            execution_result: task.execution_result().map(str::to_owned),
            review_result: task.review_result().map(str::to_owned),
            final_result: task.final_result().map(str::to_owned),
            template: task.template().map(str::to_owned),
            skill_config,
            retry_count: task.retry_count(),
            provisional: task.provisional(),
            fail_reason: task.fail_reason().map(str::to_owned),
            fail_step: task.fail_step(),
            elapsed_ms,
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// Read-only query service over the task store.
pub struct ResultProjector<R>
where
    R: TaskRepository,
{
    repository: Arc<R>,
}

impl<R> Clone for ResultProjector<R>
where
    R: TaskRepository,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R> ResultProjector<R>
where
    R: TaskRepository,
{
    /// Creates a projector backed by `repository`.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns the progress view for a task.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::TaskNotFound`] for unknown identifiers.
    pub async fn status(&self, id: TaskId) -> Result<TaskStatusView, ProjectionError> {
        let task = self.load(id).await?;
        Ok(TaskStatusView::from(&task))
    }

    /// Returns the full result view for a task, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::TaskNotFound`] for unknown identifiers.
    pub async fn result(&self, id: TaskId) -> Result<TaskResultView, ProjectionError> {
        let task = self.load(id).await?;
        Ok(TaskResultView::from(&task))
    }

    async fn load(&self, id: TaskId) -> Result<Task, ProjectionError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ProjectionError::TaskNotFound(id))
    }
}

/// Returns the body of the first ```` ```yaml ```` or ```` ```yml ```` fenced
/// block in `text`.
///
/// An unclosed fence yields `None`.
#[must_use]
pub fn extract_skill_config(text: &str) -> Option<String> {
    let mut lines = text.lines();
    lines.find(|line| {
        let fence = line.trim_start();
        fence
            .strip_prefix("```")
            .map(|lang| lang.trim().to_ascii_lowercase())
            .is_some_and(|lang| lang == "yaml" || lang == "yml")
    })?;

    let mut body = Vec::new();
    for line in lines {
        if line.trim_start().starts_with("```") {
            return Some(body.join("\n"));
        }
        body.push(line);
    }
    None
}
