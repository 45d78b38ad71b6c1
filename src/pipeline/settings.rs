//! Retry bound and review-exhaustion policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What happens when every review round fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Finalize anyway and flag the result as provisional.
    #[default]
    Degrade,
    /// Mark the task failed at the reviewing stage.
    Fail,
}

impl fmt::Display for ExhaustionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Degrade => "degrade",
            Self::Fail => "fail",
        })
    }
}

/// Invalid pipeline settings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// `max_retries` is outside the supported range.
    #[error("max_retries must be between 1 and {limit}, got {value}")]
    MaxRetriesOutOfRange {
        /// Rejected value.
        value: u32,
        /// Upper bound.
        limit: u32,
    },
}

/// Validated orchestrator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    max_retries: u32,
    exhaustion_policy: ExhaustionPolicy,
}

impl PipelineSettings {
    /// Default number of Executor/Reviewer rounds.
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    /// Largest accepted `max_retries`.
    pub const MAX_RETRIES_LIMIT: u32 = 10;

    /// Creates settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MaxRetriesOutOfRange`] unless
    /// `1 <= max_retries <= MAX_RETRIES_LIMIT`.
    pub const fn new(
        max_retries: u32,
        exhaustion_policy: ExhaustionPolicy,
    ) -> Result<Self, SettingsError> {
        if max_retries == 0 || max_retries > Self::MAX_RETRIES_LIMIT {
            return Err(SettingsError::MaxRetriesOutOfRange {
                value: max_retries,
                limit: Self::MAX_RETRIES_LIMIT,
            });
        }
        Ok(Self {
            max_retries,
            exhaustion_policy,
        })
    }

    /// Maximum Executor/Reviewer rounds.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Policy applied when no round passes.
    #[must_use]
    pub const fn exhaustion_policy(&self) -> ExhaustionPolicy {
        self.exhaustion_policy
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_retries: Self::DEFAULT_MAX_RETRIES,
            exhaustion_policy: ExhaustionPolicy::Degrade,
        }
    }
}
