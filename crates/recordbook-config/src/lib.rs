//! recordbook-config
//!
//! Persistent settings for the record book tools: where the store lives,
//! the log filter and the reversal description prefix.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::Config;
