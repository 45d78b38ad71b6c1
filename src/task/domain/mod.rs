//! Domain model for pipeline task records.
//!
//! A task is the only persisted entity of the cabinet: it carries the user's
//! request, the best-effort document text, each stage's latest output, and
//! the status that drives the pipeline state machine. Infrastructure concerns
//! stay outside of this boundary.

mod error;
mod ids;
mod patch;
mod status;
mod task;

pub use error::{ParseStageError, ParseTaskStatusError, TaskDomainError};
pub use ids::TaskId;
pub use patch::TaskPatch;
pub use status::{PipelineStage, TaskStatus};
pub use task::{NewTask, PersistedTaskData, Task};
