//! # Herald Core
//!
//! The dispatch core of the Herald chat bot.
//!
//! This crate routes decoded platform events to registered command handlers,
//! tracks minimal per-user state, and runs the ready-gated presence task.
//! The platform connection itself (handshake, sockets, wire codec) is an
//! external collaborator reached through the [`Gateway`] trait.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! Core abstractions and type system:
//! - **Event Model**: the decoded event feed ([`GatewayEvent`])
//! - **Invocation Context**: per-command identity, payload, and reply handle
//!   ([`InvocationContext`])
//! - **Message Payloads**: plain text and embeds ([`OutgoingMessage`])
//! - **Error Taxonomy**: startup vs. runtime failures ([`RegistryError`],
//!   [`DispatchError`])
//!
//! ### Framework Layer
//!
//! Event processing and routing:
//! - **Command Router**: two-level registry with namespaced commands
//!   ([`CommandRouter`], [`CommandSpec`])
//! - **State Store**: the only shared mutable resource ([`StateStore`])
//! - **Error Classifier**: one failure, one reply ([`ErrorClassifier`])
//! - **Event Dispatcher**: lifecycle state machine and fan-out
//!   ([`EventDispatcher`])
//! - **Scheduler**: ready-gated periodic task ([`ScheduledTask`])
//!
//! ### Integration Layer
//!
//! External system interfaces:
//! - **Gateway**: the outbound connection surface ([`Gateway`])
//!
//! ## Event Flow
//!
//! ```text
//! ┌────────────┐     ┌──────────────────┐     ┌───────────────┐
//! │ Connection │────▶│ EventDispatcher  │────▶│ CommandRouter │
//! │ (external) │     │ (state machine)  │────▶│ StateStore    │
//! └────────────┘     └──────────────────┘────▶│ Classifier    │
//!                            │                └───────────────┘
//!                            ▼ ready signal
//!                    ┌──────────────────┐
//!                    │  ScheduledTask   │──▶ presence updates
//!                    └──────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use herald_core::{CommandRouter, CommandSpec, InvocationContext};
//!
//! let mut router = CommandRouter::new('!');
//! router.register(
//!     None,
//!     CommandSpec::new("hello", "Say hello", |ctx: InvocationContext| async move {
//!         ctx.reply("Hello! my name is john. How can I help you?").await?;
//!         Ok(())
//!     }),
//! )?;
//! ```

// Architectural layers
pub mod foundation;
pub mod framework;
pub mod integration;

// Re-export foundation types
pub use foundation::{
    ChannelId, DispatchError, DispatchResult, Embed, EmbedField, GatewayEvent, HandlerError,
    HandlerResult, InvocationContext, OutgoingMessage, ReadyInfo, RegistryError, RegistryResult,
    UserId,
};

// Re-export framework types
pub use framework::{
    CommandHandler, CommandRouter, CommandSpec, ConnectionState, ErrorClassifier, EventDispatcher,
    HandlerFuture, Outcome, ReadyGate, ReadySignal, ScheduledTask, StateStore, UserRecord,
    render_presence,
};

// Re-export integration types
pub use integration::{BoxedGateway, Gateway, GatewayError, GatewayResult};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::framework::{
        CommandHandler, CommandRouter, CommandSpec, ConnectionState, EventDispatcher, Outcome,
        ScheduledTask, StateStore, UserRecord,
    };
    pub use super::integration::{BoxedGateway, Gateway, GatewayError, GatewayResult};
}
