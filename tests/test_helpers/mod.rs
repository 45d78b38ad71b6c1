//! Fixtures shared by the integration test binaries.

use std::sync::Arc;

use cabinet::gateway::{
    adapters::ScriptedProvider, domain::Role, domain::RoleBudgets, ports::ModelProvider,
    services::ModelGateway,
};
use cabinet::pipeline::{PipelineService, PipelineSettings};
use cabinet::prompt::PromptBuilder;
use cabinet::review::MarkerReviewGate;
use cabinet::task::ports::TaskRepository;
use mockable::DefaultClock;

/// Finalizer output with both tagged sections and a skill configuration.
pub const FINALIZER_OUTPUT: &str = "\
===== SUMMARY =====
Weekly report outline ready.
===== TEMPLATE =====
1. Wins
2. Blockers
```yaml
name: weekly-report
sections: [wins, blockers]
```";

/// A provider whose every role succeeds and whose first review passes.
#[must_use]
pub fn happy_provider(name: &str) -> ScriptedProvider {
    ScriptedProvider::new(name)
        .with_default_reply(Role::Planner, "1. Collect wins\n2. List blockers")
        .with_default_reply(Role::Executor, "Draft outline")
        .with_default_reply(Role::Reviewer, "Verdict: PASS")
        .with_default_reply(Role::Finalizer, FINALIZER_OUTPUT)
}

/// Builds an orchestrator over `repository` with lenient review gating.
#[must_use]
pub fn pipeline_service<R>(
    repository: Arc<R>,
    providers: &[Arc<ScriptedProvider>],
    settings: PipelineSettings,
) -> PipelineService<R, DefaultClock>
where
    R: TaskRepository + 'static,
{
    let gateway = ModelGateway::new(
        providers
            .iter()
            .map(|provider| Arc::clone(provider) as Arc<dyn ModelProvider>)
            .collect(),
        PromptBuilder::new(),
        RoleBudgets::default(),
    );
    PipelineService::new(
        repository,
        Arc::new(DefaultClock),
        Arc::new(gateway),
        Arc::new(MarkerReviewGate::default()),
        settings,
    )
}
