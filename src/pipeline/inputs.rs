//! Stage inputs synthesised from earlier stage outputs.

use crate::prompt::{PromptError, render_template};
use minijinja::context;
use serde::Serialize;

const EXECUTOR_RETRY_TEMPLATE: &str = "\
Revise the deliverable according to the reviewer feedback (revision round {{ round }} of {{ max_rounds }}).
Fix every problem the reviewer raised and keep what already works.

===== REVIEWER FEEDBACK =====
{{ feedback }}

===== ORIGINAL PLAN =====
{{ plan }}";

const FINALIZER_TEMPLATE: &str = "\
===== USER REQUEST =====
{{ request }}

===== PLAN =====
{{ plan }}

===== DELIVERABLE =====
{{ execution }}

===== REVIEW =====
{{ review }}

===== REVIEW STATUS =====
{% if passed -%}
Passed after {{ rounds }} round(s).
{%- else -%}
NOT PASSED after {{ rounds }} round(s). Mark the summary as PROVISIONAL: this result has not been fully validated.
{%- endif %}";

/// Builds the Executor input for a revision round.
///
/// The Executor sees both what was wrong last time and the plan it is
/// implementing.
///
/// # Errors
///
/// Returns [`PromptError`] if rendering fails.
pub fn executor_retry_input(
    plan: &str,
    feedback: &str,
    round: u32,
    max_rounds: u32,
) -> Result<String, PromptError> {
    render_template(
        "executor retry",
        EXECUTOR_RETRY_TEMPLATE,
        context! { plan, feedback, round, max_rounds },
    )
}

/// Everything the Finalizer is told about the run.
#[derive(Debug, Clone, Serialize)]
pub struct FinalizerInput<'a> {
    /// Original request.
    pub request: &'a str,
    /// Planner output.
    pub plan: &'a str,
    /// Latest Executor output.
    pub execution: &'a str,
    /// Latest Reviewer output.
    pub review: &'a str,
    /// Whether the latest review passed.
    pub passed: bool,
    /// Review rounds executed.
    pub rounds: u32,
}

/// Builds the Finalizer input.
///
/// # Errors
///
/// Returns [`PromptError`] if rendering fails.
pub fn finalizer_input(input: &FinalizerInput<'_>) -> Result<String, PromptError> {
    render_template("finalizer", FINALIZER_TEMPLATE, input)
}
