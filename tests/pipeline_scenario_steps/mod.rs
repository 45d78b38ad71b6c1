//! Step definitions for pipeline behaviour scenarios.

mod given;
mod then;
mod when;
pub mod world;
