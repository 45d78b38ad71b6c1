//! Review gate: decides whether a Reviewer output passes.

mod marker;
mod verdict;

pub use marker::{MarkerReviewGate, ReviewGateConfig, ReviewPreset};
pub use verdict::{ReviewVerdict, Verdict};
