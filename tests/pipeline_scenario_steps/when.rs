//! When steps for pipeline BDD scenarios.

use std::sync::Arc;

use super::world::{PipelineWorld, run_async};
use cabinet::pipeline::SubmitTaskRequest;
use cabinet::task::{domain::TaskId, ports::TaskRepository, services::ResultProjector};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when(r#"the request "{text}" is submitted and processed"#)]
fn submit_and_process(world: &mut PipelineWorld, text: String) -> Result<(), eyre::Report> {
    let service = world.service()?;
    let task_id = run_async(async move {
        let handle = service.submit(SubmitTaskRequest::new(text)).await?;
        let id = handle.task_id();
        handle.wait().await?;
        Ok::<TaskId, eyre::Report>(id)
    })
    .wrap_err("submit and run pipeline")?;

    let task = run_async(world.repository.find_by_id(task_id))?
        .ok_or_else(|| eyre::eyre!("task {task_id} missing after run"))?;
    world.task = Some(task);
    Ok(())
}

#[when("the status of task {id:i64} is requested")]
fn request_status(world: &mut PipelineWorld, id: i64) {
    let projector = ResultProjector::new(Arc::clone(&world.repository));
    world.lookup = Some(run_async(projector.status(TaskId::new(id))));
}
