//! Infrastructure adapters and runtime bootstrap.

pub mod bundle;
pub mod cms;
pub mod error;
pub mod telemetry;
