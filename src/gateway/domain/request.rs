//! Provider-neutral completion requests and input budgets.

use super::Role;
use serde::Deserialize;

/// One chat-completion call as seen by a provider adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Role being invoked.
    pub role: Role,
    /// System message; depends only on the role.
    pub system: String,
    /// User message, already truncated to the provider's budget.
    pub user: String,
    /// Output token budget for the role.
    pub max_tokens: u32,
}

/// Output token budget per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RoleBudgets {
    /// Planner budget.
    pub planner: u32,
    /// Executor budget.
    pub executor: u32,
    /// Reviewer budget.
    pub reviewer: u32,
    /// Finalizer budget.
    pub finalizer: u32,
}

impl RoleBudgets {
    /// Budget applied to every role unless configured otherwise.
    pub const DEFAULT_MAX_TOKENS: u32 = 4000;

    /// Returns the budget for `role`.
    #[must_use]
    pub const fn for_role(&self, role: Role) -> u32 {
        match role {
            Role::Planner => self.planner,
            Role::Executor => self.executor,
            Role::Reviewer => self.reviewer,
            Role::Finalizer => self.finalizer,
        }
    }
}

impl Default for RoleBudgets {
    fn default() -> Self {
        Self {
            planner: Self::DEFAULT_MAX_TOKENS,
            executor: Self::DEFAULT_MAX_TOKENS,
            reviewer: Self::DEFAULT_MAX_TOKENS,
            finalizer: Self::DEFAULT_MAX_TOKENS,
        }
    }
}

/// Cuts `text` to at most `max_chars` characters and appends a marker
/// stating how many characters were dropped.
///
/// Text within the budget is returned unchanged.
#[must_use]
pub fn truncate_with_marker(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_owned();
    }
    let kept: String = text.chars().take(max_chars).collect();
    let omitted = total - max_chars;
    format!("{kept}\n\n[truncated: {omitted} characters omitted]")
}
