//! Given steps for pipeline BDD scenarios.

use std::sync::Arc;

use super::world::{PipelineWorld, run_async};
use crate::test_helpers::happy_provider;
use cabinet::gateway::{
    adapters::{ScriptedProvider, ScriptedReply},
    domain::Role,
};
use cabinet::pipeline::{ExhaustionPolicy, PipelineSettings};
use cabinet::task::ports::TaskRepository;
use rstest_bdd_macros::given;

#[given(r#"a provider "{name}" where every stage succeeds"#)]
fn provider_succeeds(world: &mut PipelineWorld, name: String) {
    world.providers.push(Arc::new(happy_provider(&name)));
}

#[given(r#"a provider "{name}" that fails when planning"#)]
fn provider_fails_planning(world: &mut PipelineWorld, name: String) {
    let provider = ScriptedProvider::new(name).with_failure(Role::Planner, "503 service unavailable");
    world.providers.push(Arc::new(provider));
}

#[given("the reviewer fails {failures:u32} times before passing")]
fn reviewer_fails_then_passes(
    world: &mut PipelineWorld,
    failures: u32,
) -> Result<(), eyre::Report> {
    let provider = world.primary()?;
    for round in 1..=failures {
        provider.push(
            Role::Executor,
            ScriptedReply::Text(format!("Deliverable round {round}")),
        );
        provider.push(
            Role::Reviewer,
            ScriptedReply::Text(format!("Verdict: FAIL\nRound {round} is missing figures.")),
        );
    }
    let passing_round = failures + 1;
    provider.push(
        Role::Executor,
        ScriptedReply::Text(format!("Deliverable round {passing_round}")),
    );
    provider.push(
        Role::Reviewer,
        ScriptedReply::Text(format!("Verdict: PASS\nRound {passing_round} approved.")),
    );
    Ok(())
}

#[given("the reviewer always fails")]
fn reviewer_always_fails(world: &mut PipelineWorld) -> Result<(), eyre::Report> {
    let provider = world.primary()?;
    for _ in 0..PipelineSettings::MAX_RETRIES_LIMIT {
        provider.push(
            Role::Reviewer,
            ScriptedReply::Text("Verdict: FAIL\nStill incomplete.".to_owned()),
        );
    }
    Ok(())
}

#[given("the pipeline allows {rounds:u32} review rounds")]
fn pipeline_allows_rounds(world: &mut PipelineWorld, rounds: u32) {
    world.max_retries = rounds;
}

#[given(r#"the exhaustion policy is "{policy}""#)]
fn exhaustion_policy_is(world: &mut PipelineWorld, policy: String) -> Result<(), eyre::Report> {
    world.policy = match policy.as_str() {
        "degrade" => ExhaustionPolicy::Degrade,
        "fail" => ExhaustionPolicy::Fail,
        other => return Err(eyre::eyre!("unknown exhaustion policy in scenario: {other}")),
    };
    Ok(())
}

#[given("no task has been submitted")]
fn no_task_submitted(world: &mut PipelineWorld) -> Result<(), eyre::Report> {
    let unfinished = run_async(world.repository.find_unfinished())?;
    if !unfinished.is_empty() {
        return Err(eyre::eyre!("expected an empty task store"));
    }
    Ok(())
}
