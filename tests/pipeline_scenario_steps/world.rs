//! Shared world state for pipeline BDD scenarios.

use std::sync::Arc;

use crate::test_helpers::pipeline_service;
use cabinet::gateway::adapters::ScriptedProvider;
use cabinet::pipeline::{ExhaustionPolicy, PipelineService, PipelineSettings};
use cabinet::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::Task,
    services::{ProjectionError, TaskStatusView},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestPipelineService = PipelineService<InMemoryTaskRepository, DefaultClock>;

/// Scenario world for pipeline behaviour tests.
pub struct PipelineWorld {
    pub repository: Arc<InMemoryTaskRepository>,
    pub providers: Vec<Arc<ScriptedProvider>>,
    pub max_retries: u32,
    pub policy: ExhaustionPolicy,
    pub task: Option<Task>,
    pub lookup: Option<Result<TaskStatusView, ProjectionError>>,
}

impl PipelineWorld {
    /// Creates a world with no providers and default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            repository: Arc::new(InMemoryTaskRepository::new()),
            providers: Vec::new(),
            max_retries: PipelineSettings::DEFAULT_MAX_RETRIES,
            policy: ExhaustionPolicy::default(),
            task: None,
            lookup: None,
        }
    }

    /// Returns the first configured provider.
    pub fn primary(&self) -> Result<&ScriptedProvider, eyre::Report> {
        self.providers
            .first()
            .map(|provider| provider.as_ref())
            .ok_or_else(|| eyre::eyre!("no provider configured in scenario world"))
    }

    /// Builds the orchestrator from the scenario's providers and settings.
    pub fn service(&self) -> Result<TestPipelineService, eyre::Report> {
        let settings = PipelineSettings::new(self.max_retries, self.policy)?;
        Ok(pipeline_service(
            Arc::clone(&self.repository),
            &self.providers,
            settings,
        ))
    }

    /// Returns the task processed by the scenario.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no task processed in scenario world"))
    }
}

impl Default for PipelineWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PipelineWorld {
    PipelineWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
