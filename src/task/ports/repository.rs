//! Repository port for task persistence and lookup.

use crate::task::domain::{NewTask, Task, TaskDomainError, TaskId, TaskPatch};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Implementations must be safe to share between concurrently running
/// pipelines; the store is the only state pipelines have in common.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persists a new task in `pending` status and assigns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the store rejects the
    /// write.
    async fn create(&self, new_task: &NewTask) -> TaskRepositoryResult<Task>;

    /// Applies a partial update to an existing task and returns the stored
    /// result.
    ///
    /// The patch is applied atomically: readers observe either every field
    /// of the patch or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// and [`TaskRepositoryError::Rejected`] when the patch violates the
    /// status state machine or targets a terminal task.
    async fn update(&self, id: TaskId, patch: &TaskPatch) -> TaskRepositoryResult<Task>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task that has not reached a terminal status, oldest
    /// first.
    async fn find_unfinished(&self) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The update was refused by the task state machine.
    #[error(transparent)]
    Rejected(#[from] TaskDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
