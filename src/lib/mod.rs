//! Shared library modules providing error types, path and file helpers, and telemetry initialization.

pub mod errors;
pub mod fs;
pub mod paths;
pub mod telemetry;
