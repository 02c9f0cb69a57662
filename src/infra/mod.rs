//! Infrastructure adapters and runtime bootstrap.

pub mod error;
pub mod input;
pub mod telemetry;
