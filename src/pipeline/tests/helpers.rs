//! Shared fixtures for orchestrator tests.

use std::sync::Arc;

use crate::gateway::{
    adapters::ScriptedProvider, domain::Role, domain::RoleBudgets, ports::ModelProvider,
    services::ModelGateway,
};
use crate::pipeline::{PipelineService, PipelineSettings};
use crate::prompt::PromptBuilder;
use crate::review::MarkerReviewGate;
use crate::task::adapters::memory::InMemoryTaskRepository;
use mockable::DefaultClock;

pub const FINALIZER_OUTPUT: &str = "\
===== SUMMARY =====
Weekly report outline ready.
===== TEMPLATE =====
1. Wins
2. Blockers
```yaml
name: weekly-report
```";

pub type TestService = PipelineService<InMemoryTaskRepository, DefaultClock>;

pub struct Harness {
    pub repository: Arc<InMemoryTaskRepository>,
    pub providers: Vec<Arc<ScriptedProvider>>,
    pub service: TestService,
}

impl Harness {
    pub fn new(providers: Vec<ScriptedProvider>, settings: PipelineSettings) -> Self {
        let repository = Arc::new(InMemoryTaskRepository::new());
        let scripted: Vec<Arc<ScriptedProvider>> = providers.into_iter().map(Arc::new).collect();
        let gateway = ModelGateway::new(
            scripted
                .iter()
                .map(|provider| Arc::clone(provider) as Arc<dyn ModelProvider>)
                .collect(),
            PromptBuilder::new(),
            RoleBudgets::default(),
        );
        let service = PipelineService::new(
            Arc::clone(&repository),
            Arc::new(DefaultClock),
            Arc::new(gateway),
            Arc::new(MarkerReviewGate::default()),
            settings,
        );
        Self {
            repository,
            providers: scripted,
            service,
        }
    }

    pub fn primary(&self) -> &ScriptedProvider {
        self.providers.first().expect("at least one provider")
    }
}

/// A provider whose every role succeeds and whose review passes first time.
pub fn happy_provider(name: &str) -> ScriptedProvider {
    ScriptedProvider::new(name)
        .with_default_reply(Role::Planner, "1. Collect wins\n2. List blockers")
        .with_default_reply(Role::Executor, "Draft outline")
        .with_default_reply(Role::Reviewer, "Verdict: PASS\nClear and usable.")
        .with_default_reply(Role::Finalizer, FINALIZER_OUTPUT)
}
