//! Ordered provider fallback.

use crate::gateway::{
    domain::{CompletionRequest, Role, RoleBudgets},
    ports::{ModelProvider, ProviderCallError},
};
use crate::prompt::{PromptBuilder, PromptError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors returned when a role invocation cannot be served.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The gateway was built without providers.
    #[error("no model providers are configured")]
    NoProviders,
    /// Every provider failed; carries the last failure.
    #[error("every provider failed for the {role} role; last error: {source}")]
    Exhausted {
        /// Role being invoked.
        role: Role,
        /// Failure reported by the last provider tried.
        #[source]
        source: ProviderCallError,
    },
    /// The prompt could not be rendered.
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// Invokes pipeline roles against an ordered list of providers.
#[derive(Clone)]
pub struct ModelGateway {
    providers: Vec<Arc<dyn ModelProvider>>,
    prompts: PromptBuilder,
    budgets: RoleBudgets,
}

impl ModelGateway {
    /// Creates a gateway; `providers` are tried in the given order.
    #[must_use]
    pub fn new(
        providers: Vec<Arc<dyn ModelProvider>>,
        prompts: PromptBuilder,
        budgets: RoleBudgets,
    ) -> Self {
        Self {
            providers,
            prompts,
            budgets,
        }
    }

    /// Returns the provider names in fallback order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }

    /// Invokes `role` with `input` and optional document text.
    ///
    /// Each provider receives the user message fitted to its own budget;
    /// only the document section is shortened, never the input.
    /// A failing provider is logged and the next one is tried; the first
    /// successful reply is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Exhausted`] with the last failure when every
    /// provider fails, and [`ProviderError::NoProviders`] when none are
    /// configured.
    pub async fn invoke(
        &self,
        role: Role,
        input: &str,
        document: Option<&str>,
    ) -> Result<String, ProviderError> {
        let mut last_failure = None;

        for provider in &self.providers {
            let messages = self
                .prompts
                .build_within(role, input, document, provider.max_input_chars())?;
            let request = CompletionRequest {
                role,
                system: messages.system,
                user: messages.user,
                max_tokens: self.budgets.for_role(role),
            };
            match provider.complete(&request).await {
                Ok(text) => {
                    debug!(provider = provider.name(), %role, "provider call succeeded");
                    return Ok(text);
                }
                Err(err) => {
                    warn!(
                        provider = provider.name(),
                        %role,
                        error = %err,
                        "provider call failed, trying next provider"
                    );
                    last_failure = Some(err);
                }
            }
        }

        Err(last_failure.map_or(ProviderError::NoProviders, |source| {
            ProviderError::Exhausted { role, source }
        }))
    }
}
