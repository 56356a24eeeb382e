//! Invocation context handed to command handlers.
//!
//! One [`InvocationContext`] is constructed per dispatched command and is not
//! retained beyond the single dispatch call. It bundles the invoker's
//! identity, the argument payload, and the reply handle.

use crate::foundation::event::{ChannelId, UserId};
use crate::foundation::message::OutgoingMessage;
use crate::integration::gateway::{BoxedGateway, GatewayResult};

/// The per-command bundle of invoker identity, argument text, and reply
/// channel.
///
/// # Example
///
/// ```rust,ignore
/// async fn members(ctx: InvocationContext) -> HandlerResult {
///     ctx.reply(format!("hello {}", ctx.invoker_name())).await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct InvocationContext {
    invoker: UserId,
    invoker_name: String,
    args: String,
    channel: ChannelId,
    gateway: BoxedGateway,
}

impl InvocationContext {
    /// Creates a context with an empty argument payload.
    ///
    /// The router fills the payload in via [`with_args`](Self::with_args)
    /// once the command token has been resolved.
    pub fn new(
        invoker: UserId,
        invoker_name: impl Into<String>,
        channel: ChannelId,
        gateway: BoxedGateway,
    ) -> Self {
        Self {
            invoker,
            invoker_name: invoker_name.into(),
            args: String::new(),
            channel,
            gateway,
        }
    }

    /// Returns a copy of this context carrying the given argument payload.
    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        self.args = args.into();
        self
    }

    /// The user who invoked the command.
    pub fn invoker(&self) -> &UserId {
        &self.invoker
    }

    /// The invoker's display name at send time.
    pub fn invoker_name(&self) -> &str {
        &self.invoker_name
    }

    /// The raw argument payload (everything after the command token).
    pub fn args(&self) -> &str {
        &self.args
    }

    /// The nth whitespace-separated argument token, if supplied.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.split_whitespace().nth(index)
    }

    /// The channel replies are delivered to.
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// The gateway handle, for handlers that need calls beyond replying.
    pub fn gateway(&self) -> &BoxedGateway {
        &self.gateway
    }

    /// Sends a plain-text reply to the invoking channel.
    pub async fn reply(&self, text: impl Into<String>) -> GatewayResult<()> {
        self.gateway
            .send_response(&self.channel, &OutgoingMessage::text(text))
            .await
    }

    /// Sends a structured payload (text or embed) to the invoking channel.
    pub async fn reply_message(&self, message: &OutgoingMessage) -> GatewayResult<()> {
        self.gateway.send_response(&self.channel, message).await
    }
}

impl std::fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationContext")
            .field("invoker", &self.invoker)
            .field("invoker_name", &self.invoker_name)
            .field("args", &self.args)
            .field("channel", &self.channel)
            .finish()
    }
}
