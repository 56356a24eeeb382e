//! # Herald Runtime
//!
//! Orchestration layer for the Herald chat bot: configuration loading,
//! logging setup, and the event loop that feeds the dispatch core.
//!
//! The runtime consumes a channel of decoded [`GatewayEvent`]s from the
//! platform connection (an external collaborator) and runs until the feed
//! closes or the process receives a shutdown signal.
//!
//! ```rust,ignore
//! use herald_runtime::HeraldRuntime;
//! use herald_core::CommandSpec;
//!
//! let mut runtime = HeraldRuntime::new()?;
//! runtime.command(CommandSpec::new("hello", "Say hello", hello))?;
//! runtime.run(gateway, events).await?;
//! ```
//!
//! [`GatewayEvent`]: herald_core::GatewayEvent

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, ConfigLoader, ConfigResult, HeraldConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use runtime::{HeraldRuntime, RuntimeBuilder};
