//! Marker-based review gate.
//!
//! A verdict line has the form `<label>: <token>`. Leading Markdown list,
//! heading, quote and emphasis characters are ignored, labels and tokens are
//! matched case-insensitively, and both the ASCII and the full-width colon
//! are accepted. Precedence: any fail verdict wins; otherwise any pass
//! verdict passes; otherwise the configured default for unmarked reviews
//! applies.

use super::verdict::{ReviewVerdict, Verdict};
use serde::Deserialize;

/// Named gate configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPreset {
    /// Fails only on an explicit fail verdict.
    #[default]
    Lenient,
    /// Passes only on an explicit pass verdict.
    Strict,
}

/// Marker lists and the default for reviews without a verdict line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewGateConfig {
    /// Labels that introduce a verdict, e.g. `Verdict` or `审核结论`.
    pub verdict_labels: Vec<String>,
    /// Tokens meaning pass.
    pub pass_tokens: Vec<String>,
    /// Tokens meaning fail; checked before pass tokens.
    pub fail_tokens: Vec<String>,
    /// Verdict for reviews without any recognised verdict line.
    pub unmarked: Verdict,
}

impl ReviewGateConfig {
    /// Returns the configuration for `preset`.
    #[must_use]
    pub fn preset(preset: ReviewPreset) -> Self {
        match preset {
            ReviewPreset::Lenient => Self::lenient(),
            ReviewPreset::Strict => Self::strict(),
        }
    }

    /// Unmarked reviews pass.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            verdict_labels: to_strings(&["审核结论", "结论", "Review Verdict", "Verdict"]),
            pass_tokens: to_strings(&["PASS", "通过"]),
            fail_tokens: to_strings(&["FAIL", "不通过"]),
            unmarked: Verdict::Pass,
        }
    }

    /// Unmarked reviews fail.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            unmarked: Verdict::Fail,
            ..Self::lenient()
        }
    }
}

impl Default for ReviewGateConfig {
    fn default() -> Self {
        Self::lenient()
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

/// The canonical [`ReviewVerdict`] implementation.
#[derive(Debug, Clone)]
pub struct MarkerReviewGate {
    labels: Vec<String>,
    pass_tokens: Vec<String>,
    fail_tokens: Vec<String>,
    unmarked: Verdict,
}

impl MarkerReviewGate {
    /// Builds a gate; markers are normalised to upper case once.
    #[must_use]
    pub fn new(config: ReviewGateConfig) -> Self {
        let upper = |values: Vec<String>| -> Vec<String> {
            values
                .into_iter()
                .map(|value| value.trim().to_uppercase())
                .filter(|value| !value.is_empty())
                .collect()
        };
        let mut labels = upper(config.verdict_labels);
        // Longest first so "Review Verdict" is tried before "Verdict".
        labels.sort_by_key(|label| std::cmp::Reverse(label.chars().count()));
        Self {
            labels,
            pass_tokens: upper(config.pass_tokens),
            fail_tokens: upper(config.fail_tokens),
            unmarked: config.unmarked,
        }
    }

    fn line_verdict(&self, line: &str) -> Option<Verdict> {
        let upper = line.to_uppercase();
        let body = upper.trim_start_matches(|c: char| is_decoration(c) || c.is_whitespace());
        self.labels.iter().find_map(|label| {
            let after_label = body.strip_prefix(label.as_str())?;
            let before_colon =
                after_label.trim_start_matches(|c: char| is_closing(c) || c.is_whitespace());
            let value = before_colon
                .strip_prefix(':')
                .or_else(|| before_colon.strip_prefix('：'))?
                .trim_start_matches(|c: char| is_decoration(c) || c == '`' || c.is_whitespace());
            self.token_verdict(value)
        })
    }

    fn token_verdict(&self, value: &str) -> Option<Verdict> {
        if self.fail_tokens.iter().any(|token| value.starts_with(token.as_str())) {
            return Some(Verdict::Fail);
        }
        if self.pass_tokens.iter().any(|token| value.starts_with(token.as_str())) {
            return Some(Verdict::Pass);
        }
        None
    }
}

impl Default for MarkerReviewGate {
    fn default() -> Self {
        Self::new(ReviewGateConfig::default())
    }
}

const fn is_decoration(c: char) -> bool {
    matches!(c, '#' | '*' | '-' | '>' | '_' | '【' | '[')
}

/// Emphasis and brackets that may close a decorated label.
const fn is_closing(c: char) -> bool {
    matches!(c, '*' | '_' | '】' | ']')
}

impl ReviewVerdict for MarkerReviewGate {
    fn evaluate(&self, review_text: &str) -> Verdict {
        let mut saw_pass = false;
        for line in review_text.lines() {
            match self.line_verdict(line) {
                Some(Verdict::Fail) => return Verdict::Fail,
                Some(Verdict::Pass) => saw_pass = true,
                None => {}
            }
        }
        if saw_pass {
            Verdict::Pass
        } else {
            self.unmarked
        }
    }
}
