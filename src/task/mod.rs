//! Task records and their persisted lifecycle.
//!
//! A task is one user request travelling through the four-role pipeline.
//! The task store is the single source of truth for progress: the pipeline
//! writes every stage transition through it and clients read status and
//! results back from it. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Read-side services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
