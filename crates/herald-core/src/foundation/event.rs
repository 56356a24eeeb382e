//! Decoded platform events consumed by the dispatch core.
//!
//! The connection layer (an external collaborator) owns the wire protocol.
//! By the time an event reaches this crate it has already been decoded into
//! one of the [`GatewayEvent`] variants below, so the core never sees raw
//! frames, heartbeats, or handshake traffic.
//!
//! `Connecting` and `ConnectionLost` are the meta events that drive the
//! dispatcher's lifecycle state machine; the remaining variants are only
//! processed while the session is ready.

use serde::{Deserialize, Serialize};

/// Unique identifier of a platform user.
///
/// Opaque to the core: it is only ever compared, hashed, and echoed back to
/// the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a user id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the channel a reply should be delivered to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Creates a channel id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Data carried by the ready event once the handshake completes.
#[derive(Debug, Clone)]
pub struct ReadyInfo {
    /// The display name the session is logged in as.
    pub session_name: String,
    /// Number of guilds/servers visible to the session at handshake time.
    pub guild_count: usize,
}

/// A decoded event delivered by the platform connection layer.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    /// The connection layer has started its handshake.
    Connecting,

    /// Handshake completed; the session is live.
    Ready(ReadyInfo),

    /// A textual command arrived from a user.
    CommandReceived {
        /// Who sent the command.
        invoker: UserId,
        /// The invoker's display name at send time.
        invoker_name: String,
        /// The full message text, including the command prefix.
        raw_text: String,
        /// Where the reply should go.
        channel: ChannelId,
    },

    /// A member joined a guild the session can see.
    MemberJoined {
        /// The joining user.
        user_id: UserId,
        /// Their display name at join time.
        display_name: String,
        /// Join time as unix seconds.
        joined_at: i64,
    },

    /// The platform surfaced a failure from its own command machinery.
    HandlerError {
        /// Human-readable failure description.
        description: String,
        /// Channel to notify, when the failure is tied to one.
        channel: Option<ChannelId>,
    },

    /// The connection dropped; the session is no longer live.
    ConnectionLost {
        /// Why the connection ended, as reported by the platform.
        reason: String,
    },
}

impl GatewayEvent {
    /// Returns the human-readable name of this event, used in tracing spans.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Ready(_) => "ready",
            Self::CommandReceived { .. } => "command_received",
            Self::MemberJoined { .. } => "member_joined",
            Self::HandlerError { .. } => "handler_error",
            Self::ConnectionLost { .. } => "connection_lost",
        }
    }
}
