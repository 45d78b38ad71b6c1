//! In-process provider that replays scripted replies.
//!
//! Used by tests and local dry runs; it never touches the network.

use crate::gateway::{
    domain::{CompletionRequest, Role},
    ports::{ModelProvider, ProviderCallError},
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One scripted outcome for a role invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// The call succeeds with this text.
    Text(String),
    /// The call fails with this reason.
    Failure(String),
}

/// Provider that answers from per-role queues.
///
/// A role whose queue is empty fails, unless a fallback reply was set with
/// [`ScriptedProvider::with_default_reply`].
#[derive(Debug)]
pub struct ScriptedProvider {
    name: String,
    max_input_chars: usize,
    state: Mutex<ScriptState>,
}

#[derive(Debug, Default)]
struct ScriptState {
    queues: HashMap<Role, VecDeque<ScriptedReply>>,
    defaults: HashMap<Role, String>,
    calls: Vec<CompletionRequest>,
}

impl ScriptedProvider {
    /// Creates a provider with no scripted replies.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_input_chars: usize::MAX,
            state: Mutex::new(ScriptState::default()),
        }
    }

    /// Sets the user-message budget reported to the gateway.
    #[must_use]
    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    /// Queues a successful reply for `role`.
    #[must_use]
    pub fn with_reply(self, role: Role, text: impl Into<String>) -> Self {
        self.push(role, ScriptedReply::Text(text.into()));
        self
    }

    /// Queues a failed call for `role`.
    #[must_use]
    pub fn with_failure(self, role: Role, reason: impl Into<String>) -> Self {
        self.push(role, ScriptedReply::Failure(reason.into()));
        self
    }

    /// Sets the reply returned for `role` once its queue is drained.
    #[must_use]
    pub fn with_default_reply(self, role: Role, text: impl Into<String>) -> Self {
        self.script().defaults.insert(role, text.into());
        self
    }

    /// Appends a reply to the queue for `role`.
    pub fn push(&self, role: Role, reply: ScriptedReply) {
        self.script().queues.entry(role).or_default().push_back(reply);
    }

    /// Returns every request received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.script().calls.clone()
    }

    /// Returns how many times `role` was invoked.
    #[must_use]
    pub fn call_count(&self, role: Role) -> usize {
        self.calls().iter().filter(|call| call.role == role).count()
    }

    /// Scripting keeps working after a panicking reader poisoned the lock.
    fn script(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rejected(&self, reason: impl Into<String>) -> ProviderCallError {
        ProviderCallError::Rejected {
            provider: self.name.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderCallError> {
        let reply = {
            let mut state = self
                .state
                .lock()
                .map_err(|_| self.rejected("script state poisoned"))?;
            state.calls.push(request.clone());
            let queued = state
                .queues
                .get_mut(&request.role)
                .and_then(VecDeque::pop_front);
            queued.or_else(|| {
                state
                    .defaults
                    .get(&request.role)
                    .cloned()
                    .map(ScriptedReply::Text)
            })
        };

        match reply {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Failure(reason)) => Err(self.rejected(reason)),
            None => Err(self.rejected(format!("no scripted reply for {}", request.role))),
        }
    }
}
