//! The four fixed pipeline personas.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline persona; selects the system prompt and output token budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Turns the request into an action plan.
    Planner,
    /// Produces the deliverable from the plan.
    Executor,
    /// Checks the deliverable and emits a verdict.
    Reviewer,
    /// Distils the summary and the reusable template.
    Finalizer,
}

impl Role {
    /// Every role in pipeline order.
    pub const ALL: [Self; 4] = [Self::Planner, Self::Executor, Self::Reviewer, Self::Finalizer];

    /// Returns the lowercase role name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::Executor => "executor",
            Self::Reviewer => "reviewer",
            Self::Finalizer => "finalizer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
