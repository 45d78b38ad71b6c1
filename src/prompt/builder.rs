//! User-message assembly.

use super::personas::system_prompt;
use crate::gateway::domain::{Role, truncate_with_marker};
use minijinja::Environment;
use serde::Serialize;
use thiserror::Error;

/// Marker placed in the user message when no document text is available.
pub const DOCUMENT_UNAVAILABLE_MARKER: &str = "[DOCUMENT EXTRACTION UNAVAILABLE]";

const USER_MESSAGE_TEMPLATE: &str = "\
{% if document %}===== DOCUMENT (extracted text) =====
{{ document }}
===== END OF DOCUMENT =====
{% else %}{{ unavailable_marker }}
No document text was provided, or extraction failed. Work only from the input below. Do not guess or invent what a document might contain.
{% endif %}
===== INPUT =====
{{ input }}";

/// Errors raised while rendering prompt templates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PromptError {
    /// A template failed to render.
    #[error("failed to render {template} template: {reason}")]
    Render {
        /// Template name.
        template: &'static str,
        /// Renderer message.
        reason: String,
    },
}

/// System and user messages for one role invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessages {
    /// Role persona.
    pub system: String,
    /// Document section (or its absence warning) followed by the input.
    pub user: String,
}

#[derive(Serialize)]
struct UserMessageContext<'a> {
    document: Option<&'a str>,
    unavailable_marker: &'static str,
    input: &'a str,
}

/// Builds the two messages sent to a provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    /// Creates a prompt builder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the messages for `role`.
    ///
    /// Document text that is absent or whitespace-only is treated as
    /// missing: the user message then carries
    /// [`DOCUMENT_UNAVAILABLE_MARKER`] instead of a document section.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Render`] if the template engine fails.
    pub fn build(
        &self,
        role: Role,
        input: &str,
        document: Option<&str>,
    ) -> Result<PromptMessages, PromptError> {
        let context = UserMessageContext {
            document: document.filter(|text| !text.trim().is_empty()),
            unavailable_marker: DOCUMENT_UNAVAILABLE_MARKER,
            input,
        };
        Ok(PromptMessages {
            system: system_prompt(role),
            user: render_template("user message", USER_MESSAGE_TEMPLATE, context)?,
        })
    }

    /// Builds the messages for `role`, fitting the user message to
    /// `max_chars` by truncating the document section only.
    ///
    /// The input section is always kept whole. The document receives the
    /// characters left after the input and the surrounding labels; when the
    /// input alone exceeds `max_chars` the message is returned over budget.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Render`] if the template engine fails.
    pub fn build_within(
        &self,
        role: Role,
        input: &str,
        document: Option<&str>,
        max_chars: usize,
    ) -> Result<PromptMessages, PromptError> {
        let messages = self.build(role, input, document)?;
        let total = messages.user.chars().count();
        let Some(text) = document.filter(|text| !text.trim().is_empty()) else {
            return Ok(messages);
        };
        if total <= max_chars {
            return Ok(messages);
        }
        let overhead = total.saturating_sub(text.chars().count());
        let truncated = truncate_with_marker(text, max_chars.saturating_sub(overhead));
        self.build(role, input, Some(&truncated))
    }
}

/// Renders a fixed template with `context`.
///
/// # Errors
///
/// Returns [`PromptError::Render`] naming `name` when rendering fails.
pub fn render_template(
    name: &'static str,
    template: &str,
    context: impl Serialize,
) -> Result<String, PromptError> {
    let environment = Environment::new();
    environment
        .render_str(template, context)
        .map_err(|error| PromptError::Render {
            template: name,
            reason: error.to_string(),
        })
}
