//! Verdict type and the gate contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The deliverable is accepted.
    Pass,
    /// The deliverable must be revised.
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        })
    }
}

/// Predicate over free-text Reviewer output.
pub trait ReviewVerdict: Send + Sync {
    /// Classifies `review_text`.
    fn evaluate(&self, review_text: &str) -> Verdict;

    /// Returns `true` when `review_text` passes.
    fn passes(&self, review_text: &str) -> bool {
        self.evaluate(review_text) == Verdict::Pass
    }
}
