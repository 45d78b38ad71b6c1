//! Pipeline orchestration: Planner → Executor ⇄ Reviewer → Finalizer.
//!
//! [`PipelineService`] creates tasks, drives each one through the stages on
//! its own Tokio task, and persists every transition through the task
//! store. Stage failures become a terminal `failed` status; they never reach
//! the caller that submitted the task.

mod inputs;
mod sections;
mod service;
mod settings;

pub use inputs::{FinalizerInput, executor_retry_input, finalizer_input};
pub use sections::{FinalizerSections, SUMMARY_DELIMITER, TEMPLATE_DELIMITER};
pub use service::{
    INTERRUPTED_REASON, PipelineError, PipelineHandle, PipelineService, RecoveryReport,
    SubmitTaskRequest,
};
pub use settings::{ExhaustionPolicy, PipelineSettings, SettingsError};

#[cfg(test)]
mod tests;
