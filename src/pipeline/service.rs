//! The orchestrator service.

use super::{
    inputs::{FinalizerInput, executor_retry_input, finalizer_input},
    sections::FinalizerSections,
    settings::{ExhaustionPolicy, PipelineSettings},
};
use crate::gateway::{
    domain::Role,
    services::{ModelGateway, ProviderError},
};
use crate::prompt::PromptError;
use crate::review::{ReviewVerdict, Verdict};
use crate::task::{
    domain::{NewTask, PipelineStage, Task, TaskDomainError, TaskId, TaskPatch, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{Instrument, error, info, info_span, warn};

/// Failure reason recorded for tasks caught mid-stage at start-up.
pub const INTERRUPTED_REASON: &str = "interrupted by service restart";

/// Errors raised by the orchestrator.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The submission was invalid.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The task store failed or refused a write.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Every provider failed for a role.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// A stage input could not be rendered.
    #[error(transparent)]
    Prompt(#[from] PromptError),
    /// The task to run does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// No review round passed under the fail policy.
    #[error("review did not pass after {rounds} round(s)")]
    ReviewExhausted {
        /// Rounds executed.
        rounds: u32,
    },
}

/// Submission payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTaskRequest {
    /// Free-text request.
    pub user_input: String,
    /// Best-effort document text, if any.
    pub extracted_document_text: Option<String>,
}

impl SubmitTaskRequest {
    /// Creates a request without document text.
    #[must_use]
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            extracted_document_text: None,
        }
    }

    /// Attaches extracted document text.
    #[must_use]
    pub fn with_document(mut self, text: Option<String>) -> Self {
        self.extracted_document_text = text;
        self
    }
}

/// A launched pipeline run.
#[derive(Debug)]
pub struct PipelineHandle {
    task_id: TaskId,
    join: JoinHandle<()>,
}

impl PipelineHandle {
    /// Identifier of the task being processed.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Waits for the run to reach a terminal state.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] if the run panicked or was aborted.
    pub async fn wait(self) -> Result<(), JoinError> {
        self.join.await
    }
}

/// Outcome of start-up recovery.
#[derive(Debug, Default)]
pub struct RecoveryReport {
    /// Pending tasks whose pipeline was launched again.
    pub relaunched: Vec<PipelineHandle>,
    /// Mid-stage tasks that were marked failed.
    pub interrupted: Vec<TaskId>,
}

struct StageFailure {
    stage: Option<PipelineStage>,
    error: PipelineError,
}

trait AtStage<T> {
    fn at(self, stage: PipelineStage) -> Result<T, StageFailure>;
    fn unstaged(self) -> Result<T, StageFailure>;
}

impl<T, E> AtStage<T> for Result<T, E>
where
    E: Into<PipelineError>,
{
    fn at(self, stage: PipelineStage) -> Result<T, StageFailure> {
        self.map_err(|err| StageFailure {
            stage: Some(stage),
            error: err.into(),
        })
    }

    fn unstaged(self) -> Result<T, StageFailure> {
        self.map_err(|err| StageFailure {
            stage: None,
            error: err.into(),
        })
    }
}

struct ReviewOutcome {
    execution: String,
    review: String,
    passed: bool,
    rounds: u32,
}

/// Drives tasks through the four-role pipeline.
pub struct PipelineService<R, C>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    repository: Arc<R>,
    clock: Arc<C>,
    gateway: Arc<ModelGateway>,
    gate: Arc<dyn ReviewVerdict>,
    settings: PipelineSettings,
}

impl<R, C> Clone for PipelineService<R, C>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            gateway: Arc::clone(&self.gateway),
            gate: Arc::clone(&self.gate),
            settings: self.settings,
        }
    }
}

impl<R, C> PipelineService<R, C>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates the orchestrator.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        clock: Arc<C>,
        gateway: Arc<ModelGateway>,
        gate: Arc<dyn ReviewVerdict>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            repository,
            clock,
            gateway,
            gate,
            settings,
        }
    }

    /// Returns the settings in force.
    #[must_use]
    pub const fn settings(&self) -> PipelineSettings {
        self.settings
    }

    /// Persists a new `pending` task and launches its pipeline.
    ///
    /// Returns as soon as the task row exists; the pipeline runs on its own
    /// Tokio task.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Domain`] for an empty request and
    /// [`PipelineError::Repository`] when the task cannot be stored.
    pub async fn submit(&self, request: SubmitTaskRequest) -> Result<PipelineHandle, PipelineError> {
        let new_task = NewTask::new(
            request.user_input,
            request.extracted_document_text,
            &*self.clock,
        )?;
        let task = self.repository.create(&new_task).await?;
        info!(
            task_id = %task.id(),
            has_document = task.extracted_document_text().is_some(),
            "task accepted"
        );
        Ok(self.launch(task.id()))
    }

    /// Relaunches `pending` tasks and fails tasks caught mid-stage.
    ///
    /// Call once at start-up, before accepting new submissions.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Repository`] when the store cannot be read
    /// or an interrupted task cannot be marked failed.
    pub async fn recover_interrupted(&self) -> Result<RecoveryReport, PipelineError> {
        let mut report = RecoveryReport::default();
        for task in self.repository.find_unfinished().await? {
            match task.status().stage() {
                None => {
                    info!(task_id = %task.id(), "relaunching pending task");
                    report.relaunched.push(self.launch(task.id()));
                }
                Some(stage) => {
                    warn!(task_id = %task.id(), %stage, "marking interrupted task as failed");
                    self.write(task.id(), TaskPatch::failed(INTERRUPTED_REASON, Some(stage)))
                        .await?;
                    report.interrupted.push(task.id());
                }
            }
        }
        Ok(report)
    }

    /// Runs the pipeline for an existing `pending` task to a terminal state.
    ///
    /// Every failure is recorded on the task; nothing is returned.
    pub async fn run(&self, task_id: TaskId) {
        let span = info_span!("pipeline", %task_id);
        async {
            match self.drive(task_id).await {
                Ok(()) => info!("pipeline completed"),
                Err(failure) => self.record_failure(task_id, failure).await,
            }
        }
        .instrument(span)
        .await;
    }

    fn launch(&self, task_id: TaskId) -> PipelineHandle {
        let service = self.clone();
        let join = tokio::spawn(async move { service.run(task_id).await });
        PipelineHandle { task_id, join }
    }

    async fn drive(&self, task_id: TaskId) -> Result<(), StageFailure> {
        let task = self
            .repository
            .find_by_id(task_id)
            .await
            .unstaged()?
            .ok_or(PipelineError::TaskNotFound(task_id))
            .unstaged()?;

        let plan = self.plan(&task).await?;
        let outcome = self.execute_and_review(&task, &plan).await?;

        let provisional = !outcome.passed;
        if provisional {
            match self.settings.exhaustion_policy() {
                ExhaustionPolicy::Fail => {
                    return Err(StageFailure {
                        stage: Some(PipelineStage::Reviewing),
                        error: PipelineError::ReviewExhausted {
                            rounds: outcome.rounds,
                        },
                    });
                }
                ExhaustionPolicy::Degrade => warn!(
                    rounds = outcome.rounds,
                    "review never passed, finalizing a provisional result"
                ),
            }
        }

        self.finalize(&task, &plan, &outcome).await
    }

    async fn plan(&self, task: &Task) -> Result<String, StageFailure> {
        let stage = PipelineStage::Planning;
        self.write(task.id(), TaskPatch::status(TaskStatus::Planning))
            .await
            .at(stage)?;

        let started = Instant::now();
        let plan = self
            .gateway
            .invoke(Role::Planner, task.user_input(), task.extracted_document_text())
            .await
            .at(stage)?;
        self.write(
            task.id(),
            TaskPatch::new()
                .with_planning_result(plan.as_str())
                .with_planning_duration_ms(elapsed_ms(started)),
        )
        .await
        .at(stage)?;
        info!(%stage, "plan stored");
        Ok(plan)
    }

    async fn execute_and_review(
        &self,
        task: &Task,
        plan: &str,
    ) -> Result<ReviewOutcome, StageFailure> {
        let document = task.extracted_document_text();
        let max_rounds = self.settings.max_retries();
        let mut execution_ms = 0_i64;
        let mut review_ms = 0_i64;
        let mut outcome = ReviewOutcome {
            execution: String::new(),
            review: String::new(),
            passed: false,
            rounds: 0,
        };

        while outcome.rounds < max_rounds {
            let round = outcome.rounds + 1;

            self.write(task.id(), TaskPatch::status(TaskStatus::Executing))
                .await
                .at(PipelineStage::Executing)?;
            let input = if round == 1 {
                plan.to_owned()
            } else {
                executor_retry_input(plan, &outcome.review, round, max_rounds)
                    .at(PipelineStage::Executing)?
            };
            let started = Instant::now();
            let execution = self
                .gateway
                .invoke(Role::Executor, &input, document)
                .await
                .at(PipelineStage::Executing)?;
            execution_ms = execution_ms.saturating_add(elapsed_ms(started));
            self.write(
                task.id(),
                TaskPatch::new()
                    .with_execution_result(execution.as_str())
                    .with_execution_duration_ms(execution_ms),
            )
            .await
            .at(PipelineStage::Executing)?;

            self.write(task.id(), TaskPatch::status(TaskStatus::Reviewing))
                .await
                .at(PipelineStage::Reviewing)?;
            let started_review = Instant::now();
            let review = self
                .gateway
                .invoke(Role::Reviewer, &execution, document)
                .await
                .at(PipelineStage::Reviewing)?;
            review_ms = review_ms.saturating_add(elapsed_ms(started_review));
            let verdict = self.gate.evaluate(&review);

            let mut patch = TaskPatch::new()
                .with_review_result(review.as_str())
                .with_review_duration_ms(review_ms);
            if verdict == Verdict::Fail || round > 1 {
                patch = patch.with_retry_count(round);
            }
            self.write(task.id(), patch)
                .await
                .at(PipelineStage::Reviewing)?;
            info!(round, max_rounds, %verdict, "review round finished");

            outcome = ReviewOutcome {
                execution,
                review,
                passed: verdict == Verdict::Pass,
                rounds: round,
            };
            if outcome.passed {
                break;
            }
        }

        Ok(outcome)
    }

    async fn finalize(
        &self,
        task: &Task,
        plan: &str,
        outcome: &ReviewOutcome,
    ) -> Result<(), StageFailure> {
        let stage = PipelineStage::Finalizing;
        let mut transition = TaskPatch::status(TaskStatus::Finalizing);
        if !outcome.passed {
            transition = transition.with_provisional(true);
        }
        self.write(task.id(), transition).await.at(stage)?;

        let input = finalizer_input(&FinalizerInput {
            request: task.user_input(),
            plan,
            execution: &outcome.execution,
            review: &outcome.review,
            passed: outcome.passed,
            rounds: outcome.rounds,
        })
        .at(stage)?;
        let started = Instant::now();
        let output = self
            .gateway
            .invoke(Role::Finalizer, &input, task.extracted_document_text())
            .await
            .at(stage)?;
        let sections = FinalizerSections::parse(&output);

        self.write(
            task.id(),
            TaskPatch::status(TaskStatus::Completed)
                .with_final_result(sections.summary)
                .with_template(sections.template)
                .with_finalizing_duration_ms(elapsed_ms(started)),
        )
        .await
        .at(stage)?;
        Ok(())
    }

    async fn write(&self, task_id: TaskId, patch: TaskPatch) -> Result<Task, PipelineError> {
        let stamped = patch.touched(&*self.clock);
        Ok(self.repository.update(task_id, &stamped).await?)
    }

    async fn record_failure(&self, task_id: TaskId, failure: StageFailure) {
        let StageFailure { stage, error } = failure;
        error!(stage = ?stage, error = %error, "pipeline failed");
        let patch = TaskPatch::failed(error.to_string(), stage);
        if let Err(write_error) = self.write(task_id, patch).await {
            error!(
                error = %write_error,
                "could not record the failure; task keeps its last persisted state"
            );
        }
    }
}

fn elapsed_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}
