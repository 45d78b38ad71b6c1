//! Unit tests for the gateway module.
