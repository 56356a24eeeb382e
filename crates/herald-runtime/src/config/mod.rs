//! Configuration system for the Herald runtime.
//!
//! Configuration is loaded in layers (defaults, then TOML files, then
//! `HERALD_*` environment variables) and validated before the runtime
//! starts. The single hard requirement is the connection token: a missing
//! or empty token aborts process start.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use schema::{
    CommandsConfig, HeraldConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, PresenceConfig,
};
pub use validation::validate_config;
