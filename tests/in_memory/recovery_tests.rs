//! Start-up recovery of tasks left unfinished by a previous process.

use std::sync::Arc;

use crate::test_helpers::{happy_provider, pipeline_service};
use cabinet::pipeline::{INTERRUPTED_REASON, PipelineSettings};
use cabinet::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{NewTask, PipelineStage, TaskPatch, TaskStatus},
    ports::TaskRepository,
};
use mockable::DefaultClock;

#[tokio::test(flavor = "multi_thread")]
async fn restart_relaunches_pending_and_fails_mid_stage_tasks() -> Result<(), eyre::Report> {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let pending = repository
        .create(&NewTask::new("Queued before restart", None, &DefaultClock)?)
        .await?;
    let running = repository
        .create(&NewTask::new("Mid-review at restart", None, &DefaultClock)?)
        .await?;
    for status in [TaskStatus::Planning, TaskStatus::Executing, TaskStatus::Reviewing] {
        repository.update(running.id(), &TaskPatch::status(status)).await?;
    }

    let providers = vec![Arc::new(happy_provider("kimi"))];
    let service = pipeline_service(Arc::clone(&repository), &providers, PipelineSettings::default());
    let report = service.recover_interrupted().await?;

    eyre::ensure!(report.interrupted == vec![running.id()], "interrupted {:?}", report.interrupted);
    for handle in report.relaunched {
        handle.wait().await?;
    }

    let relaunched = repository
        .find_by_id(pending.id())
        .await?
        .ok_or_else(|| eyre::eyre!("pending task missing"))?;
    eyre::ensure!(relaunched.status() == TaskStatus::Completed, "status {}", relaunched.status());

    let interrupted = repository
        .find_by_id(running.id())
        .await?
        .ok_or_else(|| eyre::eyre!("running task missing"))?;
    eyre::ensure!(interrupted.status() == TaskStatus::Failed, "status {}", interrupted.status());
    eyre::ensure!(
        interrupted.fail_reason() == Some(INTERRUPTED_REASON),
        "reason {:?}",
        interrupted.fail_reason()
    );
    eyre::ensure!(
        interrupted.fail_step() == Some(PipelineStage::Reviewing),
        "step {:?}",
        interrupted.fail_step()
    );
    Ok(())
}
