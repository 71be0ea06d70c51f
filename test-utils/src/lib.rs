//! Shared test utilities for the AzureAD provider crates.
//!
//! This crate provides:
//! - Proptest generators for identifiers and key credentials
//! - An in-memory applications API with simulated replication lag
//! - Test fixtures with sample data

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
pub use mocks::{ApiCall, Failure, MockApplicationsClient};

/// Install a debug-level subscriber for the current test binary.
pub fn init_test_tracing() {
    provider_common::init_tracing(&provider_common::TracingConfig::default().with_log_level("debug"));
}
