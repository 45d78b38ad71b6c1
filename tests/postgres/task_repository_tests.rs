//! `PostgreSQL` task store behaviour.

use std::sync::Arc;

use crate::postgres::helpers::{database_url, setup_repository};
use crate::test_helpers::{happy_provider, pipeline_service};
use cabinet::pipeline::{PipelineSettings, SubmitTaskRequest};
use cabinet::task::{
    domain::{NewTask, PipelineStage, TaskDomainError, TaskId, TaskPatch, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::DefaultClock;

fn new_task(input: &str, document: Option<&str>) -> Result<NewTask, eyre::Report> {
    Ok(NewTask::new(input, document.map(str::to_owned), &DefaultClock)?)
}

#[tokio::test(flavor = "multi_thread")]
async fn create_and_find_round_trips_every_field() -> Result<(), eyre::Report> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (_schema, repository) = setup_repository(&url).await?;

    let created = repository
        .create(&new_task("Write a weekly report outline", Some("Q3 figures"))?)
        .await?;
    let second = repository.create(&new_task("Another", None)?).await?;
    eyre::ensure!(second.id().value() > created.id().value(), "ids must increase");

    repository
        .update(created.id(), &TaskPatch::status(TaskStatus::Planning))
        .await?;
    repository
        .update(
            created.id(),
            &TaskPatch::new()
                .with_planning_result("1. Collect wins")
                .with_planning_duration_ms(1_250)
                .with_retry_count(2)
                .with_provisional(true),
        )
        .await?;

    let stored = repository
        .find_by_id(created.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task missing"))?;
    eyre::ensure!(stored.status() == TaskStatus::Planning, "status {}", stored.status());
    eyre::ensure!(stored.extracted_document_text() == Some("Q3 figures"), "document lost");
    eyre::ensure!(stored.planning_result() == Some("1. Collect wins"), "plan lost");
    eyre::ensure!(stored.planning_duration_ms() == 1_250, "duration lost");
    eyre::ensure!(stored.retry_count() == 2, "retry count lost");
    eyre::ensure!(stored.provisional(), "provisional flag lost");
    eyre::ensure!(stored.execution_result().is_none(), "unexpected execution result");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn store_rejects_invalid_transitions_and_terminal_writes() -> Result<(), eyre::Report> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (_schema, repository) = setup_repository(&url).await?;
    let task = repository.create(&new_task("Plan a launch", None)?).await?;

    let skipped = repository
        .update(task.id(), &TaskPatch::status(TaskStatus::Reviewing))
        .await;
    eyre::ensure!(
        matches!(
            skipped,
            Err(TaskRepositoryError::Rejected(TaskDomainError::InvalidStatusTransition { .. }))
        ),
        "expected rejected transition, got {skipped:?}"
    );

    repository
        .update(
            task.id(),
            &TaskPatch::failed("provider outage", Some(PipelineStage::Planning)),
        )
        .await?;
    let after_terminal = repository
        .update(task.id(), &TaskPatch::new().with_planning_result("late"))
        .await;
    eyre::ensure!(
        matches!(
            after_terminal,
            Err(TaskRepositoryError::Rejected(TaskDomainError::TerminalTask { .. }))
        ),
        "expected terminal rejection, got {after_terminal:?}"
    );

    let stored = repository
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task missing"))?;
    eyre::ensure!(stored.fail_step() == Some(PipelineStage::Planning), "fail step lost");
    eyre::ensure!(stored.planning_result().is_none(), "rejected patch was written");

    let missing = repository
        .update(TaskId::new(i64::MAX), &TaskPatch::status(TaskStatus::Planning))
        .await;
    eyre::ensure!(
        matches!(missing, Err(TaskRepositoryError::NotFound(_))),
        "expected NotFound, got {missing:?}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn find_unfinished_skips_terminal_tasks() -> Result<(), eyre::Report> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (_schema, repository) = setup_repository(&url).await?;
    let pending = repository.create(&new_task("pending", None)?).await?;
    let failed = repository.create(&new_task("failed", None)?).await?;
    repository
        .update(failed.id(), &TaskPatch::failed("gave up", None))
        .await?;

    let unfinished = repository.find_unfinished().await?;
    let ids: Vec<TaskId> = unfinished.iter().map(|task| task.id()).collect();
    eyre::ensure!(ids == vec![pending.id()], "unexpected unfinished tasks {ids:?}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn pipeline_completes_against_postgres() -> Result<(), eyre::Report> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (_schema, store) = setup_repository(&url).await?;
    let repository = Arc::new(store);
    let providers = vec![Arc::new(happy_provider("kimi"))];
    let service = pipeline_service(Arc::clone(&repository), &providers, PipelineSettings::default());

    let handle = service
        .submit(SubmitTaskRequest::new("Write a weekly report outline"))
        .await?;
    let task_id = handle.task_id();
    handle.wait().await?;

    let stored = repository
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| eyre::eyre!("task missing"))?;
    eyre::ensure!(stored.status() == TaskStatus::Completed, "status {}", stored.status());
    eyre::ensure!(
        stored.final_result() == Some("Weekly report outline ready."),
        "final result {:?}",
        stored.final_result()
    );
    eyre::ensure!(stored.template().is_some(), "template missing");
    Ok(())
}
