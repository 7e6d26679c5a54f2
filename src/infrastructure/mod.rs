//! Infrastructure layer module
//!
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//! - Setup and wiring of the running service

pub mod config;
pub mod logging;
pub mod setup;
