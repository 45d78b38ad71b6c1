//! Unit tests for the pipeline module.

mod helpers;
