//! Foundation layer - Core abstractions and type system.
//!
//! This module contains the fundamental building blocks of the Herald core:
//! - Decoded platform events delivered by the connection layer
//! - Invocation context carried into command handlers
//! - Outgoing message payloads (plain text and embeds)
//! - The error taxonomy shared by the dispatch pipeline

pub mod context;
pub mod error;
pub mod event;
pub mod message;

pub use context::InvocationContext;
pub use error::{
    DispatchError, DispatchResult, HandlerError, HandlerResult, RegistryError, RegistryResult,
};
pub use event::{ChannelId, GatewayEvent, ReadyInfo, UserId};
pub use message::{Embed, EmbedField, OutgoingMessage};
