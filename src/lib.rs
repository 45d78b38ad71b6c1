//! Cabinet: a four-role LLM pipeline orchestrator.
//!
//! A request becomes a persisted task that moves through Planner, Executor,
//! Reviewer and Finalizer stages. The Executor/Reviewer pair loops until the
//! review passes or the round budget runs out; clients poll the task store
//! for progress and the final result.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, APIs, etc.)
//!
//! # Modules
//!
//! - [`task`]: Task aggregate, state machine, storage and result views
//! - [`gateway`]: Model providers with ordered fallback
//! - [`prompt`]: Role personas and user-message assembly
//! - [`review`]: Pass/fail decision over Reviewer output
//! - [`pipeline`]: The orchestrator
//! - [`extraction`]: Best-effort document text extraction
//! - [`http`]: HTTP surface
//! - [`config`]: TOML configuration with environment overrides

pub mod config;
pub mod extraction;
pub mod gateway;
pub mod http;
pub mod pipeline;
pub mod prompt;
pub mod review;
pub mod task;
