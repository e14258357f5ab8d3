pub mod config;
pub mod error;
pub mod evaluation;
pub mod insights;
pub mod telemetry;
