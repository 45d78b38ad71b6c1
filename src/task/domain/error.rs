//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The user request is empty after trimming.
    #[error("user input must not be empty")]
    EmptyUserInput,

    /// The requested status change is not an edge of the pipeline state
    /// machine.
    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        /// Task whose status change was rejected.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// The task already reached `completed` or `failed`.
    #[error("task {task_id} is terminal ({status}) and can no longer change")]
    TerminalTask {
        /// Terminal task identifier.
        task_id: TaskId,
        /// Terminal status the task holds.
        status: TaskStatus,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing pipeline stage names.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown pipeline stage: {0}")]
pub struct ParseStageError(pub String);
