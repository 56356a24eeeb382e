//! Gateway trait and related types.
//!
//! This module defines the `Gateway` trait, the outbound surface of the
//! platform connection. The core calls it to deliver responses and to update
//! the bot's displayed presence; the connection layer implements it.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::foundation::event::ChannelId;
use crate::foundation::message::OutgoingMessage;

/// Errors reported by gateway calls.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The session is not connected.
    #[error("gateway is not connected")]
    NotConnected,

    /// The platform did not answer in time.
    #[error("gateway call timed out")]
    Timeout,

    /// The platform rejected or dropped an outbound message.
    #[error("failed to deliver message: {0}")]
    SendFailed(String),

    /// Any other gateway-side failure.
    #[error("{0}")]
    Other(String),
}

/// Result type for gateway calls.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// The outbound surface of the platform connection.
///
/// Implementations live with the connection collaborator; the core only
/// holds a [`BoxedGateway`] and awaits these calls. All methods are
/// suspending I/O from the core's point of view, so no lock may be held
/// across them.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// The display name the session is logged in as.
    fn session_name(&self) -> &str;

    /// Delivers a response payload to a channel.
    async fn send_response(
        &self,
        channel: &ChannelId,
        message: &OutgoingMessage,
    ) -> GatewayResult<()>;

    /// Replaces the bot's publicly displayed status text.
    async fn set_presence(&self, status: &str) -> GatewayResult<()>;

    /// Number of guilds/servers currently visible to the session.
    async fn guild_count(&self) -> GatewayResult<usize>;
}

/// A shared gateway trait object.
pub type BoxedGateway = Arc<dyn Gateway>;
