pub mod adoption;
pub mod config;
pub mod error;
pub mod telemetry;
