//! End-to-end flow through the public orchestrator and projector APIs.

use std::sync::Arc;

use crate::test_helpers::{happy_provider, pipeline_service};
use cabinet::gateway::{adapters::ScriptedProvider, domain::Role};
use cabinet::pipeline::{PipelineSettings, SubmitTaskRequest};
use cabinet::prompt::DOCUMENT_UNAVAILABLE_MARKER;
use cabinet::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{NewTask, TaskStatus},
    ports::TaskRepository,
    services::ResultProjector,
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn repository() -> Arc<InMemoryTaskRepository> {
    Arc::new(InMemoryTaskRepository::new())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_result_view_exposes_summary_template_and_skill_config(
    repository: Arc<InMemoryTaskRepository>,
) -> Result<(), eyre::Report> {
    let providers = vec![Arc::new(happy_provider("kimi"))];
    let service = pipeline_service(Arc::clone(&repository), &providers, PipelineSettings::default());
    let projector = ResultProjector::new(Arc::clone(&repository));

    let handle = service
        .submit(SubmitTaskRequest::new("Write a weekly report outline"))
        .await?;
    let task_id = handle.task_id();
    handle.wait().await?;

    let view = projector.result(task_id).await?;
    eyre::ensure!(view.status == TaskStatus::Completed, "status {}", view.status);
    eyre::ensure!(view.progress == 100, "progress {}", view.progress);
    eyre::ensure!(
        view.final_result.as_deref() == Some("Weekly report outline ready."),
        "final result {:?}",
        view.final_result
    );
    eyre::ensure!(
        view.skill_config.as_deref() == Some("name: weekly-report\nsections: [wins, blockers]"),
        "skill config {:?}",
        view.skill_config
    );
    eyre::ensure!(view.elapsed_ms.is_some_and(|ms| ms >= 0), "elapsed time missing");

    let json = serde_json::to_value(&view)?;
    eyre::ensure!(
        json.get("taskId") == Some(&serde_json::json!(task_id.value())),
        "taskId key missing: {json}"
    );
    eyre::ensure!(
        json.get("status") == Some(&serde_json::json!("completed")),
        "status not snake_case: {json}"
    );
    eyre::ensure!(json.get("skillConfig").is_some(), "skillConfig key missing: {json}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pending_task_reports_zero_progress_and_no_elapsed_time(
    repository: Arc<InMemoryTaskRepository>,
) -> Result<(), eyre::Report> {
    let task = repository
        .create(&NewTask::new("Draft a memo", None, &DefaultClock)?)
        .await?;
    let projector = ResultProjector::new(Arc::clone(&repository));

    let status = projector.status(task.id()).await?;
    eyre::ensure!(status.status == TaskStatus::Pending, "status {}", status.status);
    eyre::ensure!(status.progress == 0, "progress {}", status.progress);
    eyre::ensure!(status.planning_result.is_none(), "unexpected plan");

    let result = projector.result(task.id()).await?;
    eyre::ensure!(result.elapsed_ms.is_none(), "pending task has no elapsed time");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_document_is_announced_to_every_stage(
    repository: Arc<InMemoryTaskRepository>,
) -> Result<(), eyre::Report> {
    let provider = Arc::new(happy_provider("kimi"));
    let service = pipeline_service(
        Arc::clone(&repository),
        &[Arc::clone(&provider)],
        PipelineSettings::default(),
    );

    let handle = service
        .submit(SubmitTaskRequest::new("Summarise the attached contract").with_document(None))
        .await?;
    handle.wait().await?;

    let calls = provider.calls();
    eyre::ensure!(calls.len() == 4, "expected four stage calls, got {}", calls.len());
    for call in &calls {
        eyre::ensure!(
            call.user.contains(DOCUMENT_UNAVAILABLE_MARKER),
            "{} input lacks the unavailable marker",
            call.role
        );
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_provider_takes_over_when_first_is_down(
    repository: Arc<InMemoryTaskRepository>,
) -> Result<(), eyre::Report> {
    let down = Arc::new(ScriptedProvider::new("kimi"));
    let backup = Arc::new(happy_provider("deepseek"));
    let service = pipeline_service(
        Arc::clone(&repository),
        &[Arc::clone(&down), Arc::clone(&backup)],
        PipelineSettings::default(),
    );

    let handle = service
        .submit(SubmitTaskRequest::new("Write a weekly report outline"))
        .await?;
    let task_id = handle.task_id();
    handle.wait().await?;

    let task = repository
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| eyre::eyre!("task missing"))?;
    eyre::ensure!(task.status() == TaskStatus::Completed, "status {}", task.status());
    eyre::ensure!(down.call_count(Role::Planner) == 1, "primary was not tried first");
    eyre::ensure!(backup.call_count(Role::Finalizer) == 1, "backup did not finalize");
    Ok(())
}
