//! Configuration Module
//!
//! Environment-driven settings for the engine binary.

mod settings;

pub use settings::{ConfigError, EngineConfig, WireDelimiter};
