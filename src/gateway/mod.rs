//! Model gateway: invoke a pipeline role against ordered model providers.
//!
//! Providers are tried in configuration order; a failing provider is logged
//! and skipped, and only total exhaustion reaches the caller.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The fallback service in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
