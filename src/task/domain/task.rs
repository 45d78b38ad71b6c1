//! Task aggregate root and creation payload.

use super::{PipelineStage, TaskDomainError, TaskId, TaskPatch, TaskStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated payload for a task that has not been stored yet.
///
/// The store assigns the identifier when it persists this payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    user_input: String,
    extracted_document_text: Option<String>,
    created_at: DateTime<Utc>,
}

impl NewTask {
    /// Creates a pending task payload.
    ///
    /// Whitespace-only document text is normalised to `None`: both mean the
    /// extraction produced nothing usable.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyUserInput`] when `user_input` is empty
    /// after trimming.
    pub fn new(
        user_input: impl Into<String>,
        extracted_document_text: Option<String>,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let user_input = user_input.into();
        if user_input.trim().is_empty() {
            return Err(TaskDomainError::EmptyUserInput);
        }
        Ok(Self {
            user_input,
            extracted_document_text: extracted_document_text.filter(|text| !text.trim().is_empty()),
            created_at: clock.utc(),
        })
    }

    /// Returns the original request.
    #[must_use]
    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    /// Returns the extracted document text, if any.
    #[must_use]
    pub fn extracted_document_text(&self) -> Option<&str> {
        self.extracted_document_text.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    user_input: String,
    extracted_document_text: Option<String>,
    status: TaskStatus,
    planning_result: Option<String>,
    execution_result: Option<String>,
    review_result: Option<String>,
    final_result: Option<String>,
    template: Option<String>,
    retry_count: u32,
    provisional: bool,
    fail_reason: Option<String>,
    fail_step: Option<PipelineStage>,
    planning_duration_ms: i64,
    execution_duration_ms: i64,
    review_duration_ms: i64,
    finalizing_duration_ms: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Original request.
    pub user_input: String,
    /// Best-effort document text.
    pub extracted_document_text: Option<String>,
    /// Lifecycle status.
    pub status: TaskStatus,
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
    /// Review rounds counter.
    pub retry_count: u32,
    /// Whether the final result was produced without a passing review.
    pub provisional: bool,
    /// Failure explanation.
    pub fail_reason: Option<String>,
    /// Stage that failed.
    pub fail_step: Option<PipelineStage>,
    /// Planner duration in milliseconds.
    pub planning_duration_ms: i64,
    /// Accumulated Executor duration in milliseconds.
    pub execution_duration_ms: i64,
    /// Accumulated Reviewer duration in milliseconds.
    pub review_duration_ms: i64,
    /// Finalizer duration in milliseconds.
    pub finalizing_duration_ms: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Materialises a freshly stored task in `pending` status.
    #[must_use]
    pub fn from_new(id: TaskId, new_task: NewTask) -> Self {
        Self {
            id,
            user_input: new_task.user_input,
            extracted_document_text: new_task.extracted_document_text,
            status: TaskStatus::Pending,
            planning_result: None,
            execution_result: None,
            review_result: None,
            final_result: None,
            template: None,
            retry_count: 0,
            provisional: false,
            fail_reason: None,
            fail_step: None,
            planning_duration_ms: 0,
            execution_duration_ms: 0,
            review_duration_ms: 0,
            finalizing_duration_ms: 0,
            created_at: new_task.created_at,
            updated_at: new_task.created_at,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            user_input: data.user_input,
            extracted_document_text: data.extracted_document_text,
            status: data.status,
            planning_result: data.planning_result,
            execution_result: data.execution_result,
            review_result: data.review_result,
            final_result: data.final_result,
            template: data.template,
            retry_count: data.retry_count,
            provisional: data.provisional,
            fail_reason: data.fail_reason,
            fail_step: data.fail_step,
            planning_duration_ms: data.planning_duration_ms,
            execution_duration_ms: data.execution_duration_ms,
            review_duration_ms: data.review_duration_ms,
            finalizing_duration_ms: data.finalizing_duration_ms,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Applies a partial update.
    ///
    /// The patch is validated before any field changes, so a rejected patch
    /// leaves the task untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TerminalTask`] when the task is already
    /// `completed` or `failed`, and
    /// [`TaskDomainError::InvalidStatusTransition`] when the patch requests a
    /// status change the state machine does not allow.
    pub fn apply_patch(&mut self, patch: &TaskPatch) -> Result<(), TaskDomainError> {
        if self.status.is_terminal() {
            return Err(TaskDomainError::TerminalTask {
                task_id: self.id,
                status: self.status,
            });
        }
        if let Some(target) = patch.status {
            if !self.status.can_transition_to(target) {
                return Err(TaskDomainError::InvalidStatusTransition {
                    task_id: self.id,
                    from: self.status,
                    to: target,
                });
            }
            self.status = target;
        }

        replace_if_set(&mut self.planning_result, patch.planning_result.as_ref());
        replace_if_set(&mut self.execution_result, patch.execution_result.as_ref());
        replace_if_set(&mut self.review_result, patch.review_result.as_ref());
        replace_if_set(&mut self.final_result, patch.final_result.as_ref());
        replace_if_set(&mut self.template, patch.template.as_ref());
        replace_if_set(&mut self.fail_reason, patch.fail_reason.as_ref());
        if let Some(step) = patch.fail_step {
            self.fail_step = Some(step);
        }
        if let Some(retry_count) = patch.retry_count {
            self.retry_count = retry_count;
        }
        if let Some(provisional) = patch.provisional {
            self.provisional = provisional;
        }
        if let Some(value) = patch.planning_duration_ms {
            self.planning_duration_ms = value;
        }
        if let Some(value) = patch.execution_duration_ms {
            self.execution_duration_ms = value;
        }
        if let Some(value) = patch.review_duration_ms {
            self.review_duration_ms = value;
        }
        if let Some(value) = patch.finalizing_duration_ms {
            self.finalizing_duration_ms = value;
        }
        if let Some(updated_at) = patch.updated_at {
            self.updated_at = updated_at;
        }
        Ok(())
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the original request.
    #[must_use]
    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    /// Returns the extracted document text, if any.
    #[must_use]
    pub fn extracted_document_text(&self) -> Option<&str> {
        self.extracted_document_text.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the Planner output.
    #[must_use]
    pub fn planning_result(&self) -> Option<&str> {
        self.planning_result.as_deref()
    }

    /// Returns the latest Executor output.
    #[must_use]
    pub fn execution_result(&self) -> Option<&str> {
        self.execution_result.as_deref()
    }

    /// Returns the latest Reviewer output.
    #[must_use]
    pub fn review_result(&self) -> Option<&str> {
        self.review_result.as_deref()
    }

    /// Returns the Finalizer summary.
    #[must_use]
    pub fn final_result(&self) -> Option<&str> {
        self.final_result.as_deref()
    }

    /// Returns the reusable template.
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Returns the review rounds counter.
    #[must_use]
    pub const fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Returns whether the final result is provisional.
    #[must_use]
    pub const fn provisional(&self) -> bool {
        self.provisional
    }

    /// Returns the failure explanation.
    #[must_use]
    pub fn fail_reason(&self) -> Option<&str> {
        self.fail_reason.as_deref()
    }

    /// Returns the stage that failed.
    #[must_use]
    pub const fn fail_step(&self) -> Option<PipelineStage> {
        self.fail_step
    }

    /// Returns the Planner duration in milliseconds.
    #[must_use]
    pub const fn planning_duration_ms(&self) -> i64 {
        self.planning_duration_ms
    }

    /// Returns the accumulated Executor duration in milliseconds.
    #[must_use]
    pub const fn execution_duration_ms(&self) -> i64 {
        self.execution_duration_ms
    }

    /// Returns the accumulated Reviewer duration in milliseconds.
    #[must_use]
    pub const fn review_duration_ms(&self) -> i64 {
        self.review_duration_ms
    }

    /// Returns the Finalizer duration in milliseconds.
    #[must_use]
    pub const fn finalizing_duration_ms(&self) -> i64 {
        self.finalizing_duration_ms
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn replace_if_set(field: &mut Option<String>, value: Option<&String>) {
    if let Some(value) = value {
        *field = Some(value.clone());
    }
}
