//! # Herald
//!
//! A command-and-event dispatch framework for persistent chat bots.
//!
//! ## Overview
//!
//! Herald receives decoded platform events (connection-ready, incoming
//! commands, membership changes, failures) and routes them to registered
//! handlers, while a ready-gated background task keeps the bot's displayed
//! presence fresh. The platform connection itself is an external
//! collaborator reached through the [`Gateway`] trait.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐     ┌──────────────────┐     ┌───────────────┐
//! │ Connection │────▶│ EventDispatcher  │────▶│ CommandRouter │──▶ replies
//! │ (external) │     │ (state machine)  │────▶│ StateStore    │
//! └────────────┘     └──────────────────┘────▶│ Classifier    │──▶ replies
//!                            │                └───────────────┘
//!                            ▼ ready signal
//!                    ┌──────────────────┐
//!                    │  ScheduledTask   │──▶ presence updates
//!                    └──────────────────┘
//! ```
//!
//! - **Runtime**: configuration, logging, the event loop
//! - **Dispatcher**: lifecycle state machine; drops events while not ready
//! - **Router**: two-level registry of plain and namespaced commands
//! - **Store**: the single shared mutable resource, volatile by design
//! - **Scheduler**: one recurring presence task, gated on readiness
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! async fn hello(ctx: InvocationContext) -> HandlerResult {
//!     ctx.reply("Hello! my name is john. How can I help you?").await?;
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut runtime = HeraldRuntime::new()?;
//!     runtime.command(CommandSpec::new("hello", "Say hello", hello))?;
//!
//!     let (gateway, events) = connect().await?; // platform collaborator
//!     runtime.run(gateway, events).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `json-log`: newline-delimited JSON log output
//!
//! [`Gateway`]: herald_core::Gateway

pub use herald_core as core;
pub use herald_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use herald::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use herald_runtime::{HeraldConfig, HeraldRuntime, RuntimeBuilder};

    // Command registration and handler surface
    pub use herald_core::{
        CommandSpec, HandlerError, HandlerResult, InvocationContext, Outcome,
    };

    // Event feed and payload types
    pub use herald_core::{
        ChannelId, Embed, GatewayEvent, OutgoingMessage, ReadyInfo, UserId,
    };

    // Gateway collaborator surface
    pub use herald_core::{BoxedGateway, Gateway, GatewayError, GatewayResult};

    // Shared state
    pub use herald_core::{StateStore, UserRecord};
}
