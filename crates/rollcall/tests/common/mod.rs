//! Shared test utilities for rollcall integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated test execution with temp directories
//! - Scripted `HrClient` implementations for submission tests

pub mod clients;
pub mod harness;

pub use clients::ScriptedClient;
pub use harness::{entry, matrix_config, summary_config, TestHarness};
