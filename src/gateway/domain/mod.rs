//! Domain types for model invocations.

mod request;
mod role;

pub use request::{CompletionRequest, RoleBudgets, truncate_with_marker};
pub use role::Role;
