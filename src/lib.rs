//! Songplays ETL library
//!
//! Builds a songplay star schema out of song metadata and user activity
//! logs. The binary wires these modules together; they are exposed here for
//! testing and reuse.

pub mod activity;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod storage;

// Re-export commonly used types for convenience
pub use engine::ExecutionContext;
pub use error::{EtlError, Result};
pub use pipeline::{run, RunSummary};
