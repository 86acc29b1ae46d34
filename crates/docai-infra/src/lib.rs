//! DocAI Infrastructure Library
//!
//! Shared infrastructure used by the API binary:
//! - Telemetry initialization (tracing subscriber)
//! - The periodic cleanup service

pub mod cleanup;
pub mod telemetry;

// Re-export commonly used types
pub use cleanup::{CleanupReport, CleanupService};
pub use telemetry::init_telemetry;
