//! Read-side services for task status and result views.

mod projection;

pub use projection::{
    ProjectionError, ResultProjector, TaskResultView, TaskStatusView, extract_skill_config,
};
