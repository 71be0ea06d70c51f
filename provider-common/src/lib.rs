//! Shared plumbing for the AzureAD provider resources.
//!
//! This crate provides centralized implementations for:
//! - HTTP client configuration and building
//! - Injectable clocks for polling loops
//! - Named mutexes serializing mutations of a shared parent object
//! - Tracing subscriber initialisation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod http;
pub mod locks;
pub mod tracing_config;

pub use clock::{Clock, ManualClock, TokioClock};
pub use http::{HttpConfig, build_http_client};
pub use locks::{NamedLockGuard, NamedLocks};
pub use tracing_config::{TracingConfig, init_tracing, try_init_tracing};
