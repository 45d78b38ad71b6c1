//! Then steps for pipeline BDD scenarios.

use super::world::PipelineWorld;
use cabinet::task::{
    domain::{PipelineStage, TaskStatus},
    services::ProjectionError,
};
use rstest_bdd_macros::then;

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &PipelineWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = world.task()?;
    if task.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {} (fail reason: {:?})",
            task.status(),
            task.fail_reason()
        ));
    }
    Ok(())
}

#[then("the retry count is {count:u32}")]
fn retry_count_is(world: &PipelineWorld, count: u32) -> Result<(), eyre::Report> {
    let actual = world.task()?.retry_count();
    if actual != count {
        return Err(eyre::eyre!("expected retry count {count}, found {actual}"));
    }
    Ok(())
}

#[then("the final result is not empty")]
fn final_result_not_empty(world: &PipelineWorld) -> Result<(), eyre::Report> {
    let final_result = world.task()?.final_result().unwrap_or_default();
    if final_result.trim().is_empty() {
        return Err(eyre::eyre!("expected a final result"));
    }
    Ok(())
}

#[then("the progress is {percent:u8}")]
fn progress_is(world: &PipelineWorld, percent: u8) -> Result<(), eyre::Report> {
    let actual = world.task()?.status().progress_percent();
    if actual != percent {
        return Err(eyre::eyre!("expected progress {percent}, found {actual}"));
    }
    Ok(())
}

#[then(r#"the execution result is "{text}""#)]
fn execution_result_is(world: &PipelineWorld, text: String) -> Result<(), eyre::Report> {
    let actual = world.task()?.execution_result();
    if actual != Some(text.as_str()) {
        return Err(eyre::eyre!("expected execution result {text:?}, found {actual:?}"));
    }
    Ok(())
}

#[then(r#"the review result starts with "{prefix}""#)]
fn review_result_starts_with(world: &PipelineWorld, prefix: String) -> Result<(), eyre::Report> {
    let actual = world.task()?.review_result().unwrap_or_default();
    if !actual.starts_with(&prefix) {
        return Err(eyre::eyre!("expected review starting with {prefix:?}, found {actual:?}"));
    }
    Ok(())
}

#[then("the result is provisional")]
fn result_is_provisional(world: &PipelineWorld) -> Result<(), eyre::Report> {
    if !world.task()?.provisional() {
        return Err(eyre::eyre!("expected a provisional result"));
    }
    Ok(())
}

#[then(r#"the failed stage is "{stage}""#)]
fn failed_stage_is(world: &PipelineWorld, stage: String) -> Result<(), eyre::Report> {
    let expected = PipelineStage::try_from(stage.as_str())
        .map_err(|err| eyre::eyre!("invalid expected stage in scenario: {err}"))?;
    let actual = world.task()?.fail_step();
    if actual != Some(expected) {
        return Err(eyre::eyre!("expected fail step {expected}, found {actual:?}"));
    }
    Ok(())
}

#[then("no execution result was recorded")]
fn no_execution_result(world: &PipelineWorld) -> Result<(), eyre::Report> {
    let task = world.task()?;
    if task.execution_result().is_some() {
        return Err(eyre::eyre!(
            "expected no execution result, found {:?}",
            task.execution_result()
        ));
    }
    Ok(())
}

#[then("the lookup fails with task not found")]
fn lookup_fails_not_found(world: &PipelineWorld) -> Result<(), eyre::Report> {
    let result = world
        .lookup
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing lookup result"))?;
    if !matches!(result, Err(ProjectionError::TaskNotFound(_))) {
        return Err(eyre::eyre!("expected TaskNotFound, got {result:?}"));
    }
    Ok(())
}
