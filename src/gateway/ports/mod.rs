//! Port definitions for model providers.

pub mod provider;

pub use provider::{ModelProvider, ProviderCallError};
