//! Pipeline status state machine and stage names.

use super::{ParseStageError, ParseTaskStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been persisted but the pipeline has not started.
    Pending,
    /// The Planner is drafting the action plan.
    Planning,
    /// The Executor is producing the deliverable.
    Executing,
    /// The Reviewer is checking the latest deliverable.
    Reviewing,
    /// The Finalizer is distilling the summary and template.
    Finalizing,
    /// The pipeline finished and the final result is available.
    Completed,
    /// The pipeline stopped; `fail_reason` explains why.
    Failed,
}

impl TaskStatus {
    /// Every status, in pipeline order with `Failed` last.
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Planning,
        Self::Executing,
        Self::Reviewing,
        Self::Finalizing,
        Self::Completed,
        Self::Failed,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Planning => "planning",
            Self::Executing => "executing",
            Self::Reviewing => "reviewing",
            Self::Finalizing => "finalizing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` for `completed` and `failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns whether the state machine permits moving to `target`.
    ///
    /// The only backward edge is `reviewing → executing`, which is the
    /// retry loop. Any non-terminal status may move to `failed`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Completed | Self::Failed, _) => false,
            (_, Self::Failed) => true,
            (Self::Pending, Self::Planning)
            | (Self::Planning | Self::Reviewing, Self::Executing)
            | (Self::Executing, Self::Reviewing)
            | (Self::Reviewing, Self::Finalizing)
            | (Self::Finalizing, Self::Completed) => true,
            _ => false,
        }
    }

    /// Progress percentage reported to polling clients.
    ///
    /// `failed` reports `0`.
    #[must_use]
    pub const fn progress_percent(self) -> u8 {
        match self {
            Self::Pending | Self::Failed => 0,
            Self::Planning => 25,
            Self::Executing => 50,
            Self::Reviewing => 75,
            Self::Finalizing => 90,
            Self::Completed => 100,
        }
    }

    /// Returns the pipeline stage that runs while the task holds this status.
    #[must_use]
    pub const fn stage(self) -> Option<PipelineStage> {
        match self {
            Self::Planning => Some(PipelineStage::Planning),
            Self::Executing => Some(PipelineStage::Executing),
            Self::Reviewing => Some(PipelineStage::Reviewing),
            Self::Finalizing => Some(PipelineStage::Finalizing),
            Self::Pending | Self::Completed | Self::Failed => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseTaskStatusError(value.to_owned()))
    }
}

/// One step of the pipeline; recorded as `fail_step` when a stage fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Planner stage.
    Planning,
    /// Executor stage.
    Executing,
    /// Reviewer stage.
    Reviewing,
    /// Finalizer stage.
    Finalizing,
}

impl PipelineStage {
    /// Returns the canonical stage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.status().as_str()
    }

    /// Returns the status a task holds while this stage runs.
    #[must_use]
    pub const fn status(self) -> TaskStatus {
        match self {
            Self::Planning => TaskStatus::Planning,
            Self::Executing => TaskStatus::Executing,
            Self::Reviewing => TaskStatus::Reviewing,
            Self::Finalizing => TaskStatus::Finalizing,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PipelineStage {
    type Error = ParseStageError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        TaskStatus::try_from(value)
            .ok()
            .and_then(TaskStatus::stage)
            .ok_or_else(|| ParseStageError(value.to_owned()))
    }
}
