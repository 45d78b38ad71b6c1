//! Provider port: one external chat-completion endpoint.

use crate::gateway::domain::CompletionRequest;
use async_trait::async_trait;
use thiserror::Error;

/// An external language-model endpoint.
///
/// Implementations make exactly one attempt per call; resilience comes from
/// the gateway trying the next provider.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Maximum user-message length, in characters, this provider accepts.
    fn max_input_chars(&self) -> usize;

    /// Sends one completion request and returns the assistant text.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderCallError`] for transport failures, timeouts,
    /// non-success HTTP statuses and responses without content.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderCallError>;
}

/// Failure of a single provider call.
#[derive(Debug, Error)]
pub enum ProviderCallError {
    /// The provider answered with a non-success HTTP status.
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        /// Provider name.
        provider: String,
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },
    /// The request could not be sent or timed out.
    #[error("{provider} request failed: {source}")]
    Transport {
        /// Provider name.
        provider: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The response body was not a chat-completion payload.
    #[error("{provider} returned an unreadable response: {source}")]
    Decode {
        /// Provider name.
        provider: String,
        /// Underlying decode error.
        #[source]
        source: reqwest::Error,
    },
    /// The response carried no assistant text.
    #[error("{provider} returned an empty completion")]
    EmptyContent {
        /// Provider name.
        provider: String,
    },
    /// The provider refused the call without reaching the network.
    #[error("{provider} rejected the call: {reason}")]
    Rejected {
        /// Provider name.
        provider: String,
        /// Refusal reason.
        reason: String,
    },
}
