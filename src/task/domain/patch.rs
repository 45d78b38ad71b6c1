//! Partial task updates applied atomically by the task store.

use super::{PipelineStage, TaskStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Set of named field changes for one task update.
///
/// Fields left as `None` keep their stored value. The store applies a patch
/// as one unit, so concurrent readers observe either the whole patch or none
/// of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub(crate) status: Option<TaskStatus>,
    pub(crate) planning_result: Option<String>,
    pub(crate) execution_result: Option<String>,
    pub(crate) review_result: Option<String>,
    pub(crate) final_result: Option<String>,
    pub(crate) template: Option<String>,
    pub(crate) retry_count: Option<u32>,
    pub(crate) provisional: Option<bool>,
    pub(crate) fail_reason: Option<String>,
    pub(crate) fail_step: Option<PipelineStage>,
    pub(crate) planning_duration_ms: Option<i64>,
    pub(crate) execution_duration_ms: Option<i64>,
    pub(crate) review_duration_ms: Option<i64>,
    pub(crate) finalizing_duration_ms: Option<i64>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a patch that only moves the task to `status`.
    #[must_use]
    pub fn status(status: TaskStatus) -> Self {
        Self::new().with_status(status)
    }

    /// Creates a patch that marks the task as failed.
    #[must_use]
    pub fn failed(reason: impl Into<String>, step: Option<PipelineStage>) -> Self {
        let mut patch = Self::status(TaskStatus::Failed);
        patch.fail_reason = Some(reason.into());
        patch.fail_step = step;
        patch
    }

    /// Sets the target status.
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the Planner output.
    #[must_use]
    pub fn with_planning_result(mut self, value: impl Into<String>) -> Self {
        self.planning_result = Some(value.into());
        self
    }

    /// Sets the latest Executor output.
    #[must_use]
    pub fn with_execution_result(mut self, value: impl Into<String>) -> Self {
        self.execution_result = Some(value.into());
        self
    }

    /// Sets the latest Reviewer output.
    #[must_use]
    pub fn with_review_result(mut self, value: impl Into<String>) -> Self {
        self.review_result = Some(value.into());
        self
    }

    /// Sets the Finalizer summary.
    #[must_use]
    pub fn with_final_result(mut self, value: impl Into<String>) -> Self {
        self.final_result = Some(value.into());
        self
    }

    /// Sets the reusable template.
    #[must_use]
    pub fn with_template(mut self, value: impl Into<String>) -> Self {
        self.template = Some(value.into());
        self
    }

    /// Sets the retry counter.
    #[must_use]
    pub fn with_retry_count(mut self, value: u32) -> Self {
        self.retry_count = Some(value);
        self
    }

    /// Sets the provisional flag.
    #[must_use]
    pub fn with_provisional(mut self, value: bool) -> Self {
        self.provisional = Some(value);
        self
    }

    /// Sets the Planner duration in milliseconds.
    #[must_use]
    pub fn with_planning_duration_ms(mut self, value: i64) -> Self {
        self.planning_duration_ms = Some(value);
        self
    }

    /// Sets the accumulated Executor duration in milliseconds.
    #[must_use]
    pub fn with_execution_duration_ms(mut self, value: i64) -> Self {
        self.execution_duration_ms = Some(value);
        self
    }

    /// Sets the accumulated Reviewer duration in milliseconds.
    #[must_use]
    pub fn with_review_duration_ms(mut self, value: i64) -> Self {
        self.review_duration_ms = Some(value);
        self
    }

    /// Sets the Finalizer duration in milliseconds.
    #[must_use]
    pub fn with_finalizing_duration_ms(mut self, value: i64) -> Self {
        self.finalizing_duration_ms = Some(value);
        self
    }

    /// Stamps the patch with the current clock time as `updated_at`.
    #[must_use]
    pub fn touched(mut self, clock: &impl Clock) -> Self {
        self.updated_at = Some(clock.utc());
        self
    }

    /// Returns the target status, if the patch changes it.
    #[must_use]
    pub const fn target_status(&self) -> Option<TaskStatus> {
        self.status
    }
}
