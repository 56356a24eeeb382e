//! Central event dispatcher.
//!
//! The [`EventDispatcher`] receives decoded [`GatewayEvent`]s and forwards
//! each to the right component: commands to the [`CommandRouter`], membership
//! changes to the [`StateStore`], failures to the [`ErrorClassifier`]. It
//! also owns the connection lifecycle state machine:
//!
//! ```text
//! Disconnected ──▶ Connecting ──▶ Ready
//!       ▲                           │
//!       └────── connection lost ◀───┘
//! ```
//!
//! While the session is not `Ready`, command and membership events are
//! dropped; nothing is processed until the handshake completes again. On the
//! transition into `Ready` the dispatcher fires the readiness signal (which
//! unblocks the background scheduler) and sets the initial presence line.
//!
//! Every runtime failure is caught here, classified, and answered with
//! exactly one user-visible reply; a handler error never terminates the
//! process.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{Instrument, Level, debug, error, info, span, warn};

use crate::foundation::context::InvocationContext;
use crate::foundation::error::DispatchError;
use crate::foundation::event::{ChannelId, GatewayEvent, ReadyInfo};
use crate::foundation::message::OutgoingMessage;
use crate::framework::classifier::ErrorClassifier;
use crate::framework::readiness::{ReadyGate, ReadySignal};
use crate::framework::router::CommandRouter;
use crate::framework::store::StateStore;
use crate::integration::gateway::BoxedGateway;

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No live session (initial state, and after a connection loss).
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Session live; events are processed.
    Ready,
}

/// Renders a presence template, substituting the `{count}` placeholder.
pub fn render_presence(template: &str, guild_count: usize) -> String {
    template.replace("{count}", &guild_count.to_string())
}

/// The central dispatcher over the decoded event feed.
///
/// # Thread Safety
///
/// `EventDispatcher` is `Send + Sync`; events may be handled from any number
/// of concurrently spawned tasks. The lifecycle state lives behind its own
/// short-lived lock, never held across a suspension point.
pub struct EventDispatcher {
    router: Arc<CommandRouter>,
    store: Arc<StateStore>,
    gateway: BoxedGateway,
    classifier: ErrorClassifier,
    state: Mutex<ConnectionState>,
    ready: ReadySignal,
    presence_template: String,
}

impl EventDispatcher {
    /// Creates a dispatcher in the `Disconnected` state.
    pub fn new(
        router: Arc<CommandRouter>,
        store: Arc<StateStore>,
        gateway: BoxedGateway,
        presence_template: impl Into<String>,
    ) -> Self {
        let classifier = ErrorClassifier::new(router.prefix());
        Self {
            router,
            store,
            gateway,
            classifier,
            state: Mutex::new(ConnectionState::Disconnected),
            ready: ReadySignal::new(),
            presence_template: presence_template.into(),
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Subscribes a gate on the one-shot readiness signal.
    pub fn ready_gate(&self) -> ReadyGate {
        self.ready.gate()
    }

    /// The shared state store handle.
    pub fn store(&self) -> Arc<StateStore> {
        Arc::clone(&self.store)
    }

    /// Routes one decoded event.
    ///
    /// Never panics and never returns an error: every runtime failure ends
    /// as a classified reply and a log line.
    pub async fn handle_event(&self, event: GatewayEvent) {
        let span = span!(Level::DEBUG, "event", name = %event.event_name());
        self.route_event(event).instrument(span).await
    }

    async fn route_event(&self, event: GatewayEvent) {
        match event {
            GatewayEvent::Connecting => {
                *self.state.lock() = ConnectionState::Connecting;
                info!("Connecting to platform");
            }
            GatewayEvent::Ready(info) => self.on_ready(info).await,
            GatewayEvent::ConnectionLost { reason } => {
                *self.state.lock() = ConnectionState::Disconnected;
                warn!(reason = %reason, "Connection lost");
            }
            GatewayEvent::CommandReceived {
                invoker,
                invoker_name,
                raw_text,
                channel,
            } => {
                if self.state() != ConnectionState::Ready {
                    debug!("Dropping command event while not ready");
                    return;
                }
                // Every command event counts as one observed message from the
                // invoker; a no-op for users the store does not track.
                self.store.increment_message_count(&invoker);

                let ctx = InvocationContext::new(
                    invoker,
                    invoker_name,
                    channel.clone(),
                    Arc::clone(&self.gateway),
                );
                if let Err(err) = self.router.dispatch(&raw_text, ctx).await {
                    self.report_failure(&channel, &err).await;
                }
            }
            GatewayEvent::MemberJoined {
                user_id,
                display_name,
                joined_at,
            } => {
                if self.state() != ConnectionState::Ready {
                    debug!("Dropping membership event while not ready");
                    return;
                }
                info!(user = %user_id, name = %display_name, "Member joined");
                self.store.upsert(user_id, display_name, joined_at);
            }
            GatewayEvent::HandlerError {
                description,
                channel,
            } => {
                error!(error = %description, "Platform reported a handler failure");
                if let Some(channel) = channel {
                    let text = self.classifier.failure_text(&description);
                    self.send_text(&channel, text).await;
                }
            }
        }
    }

    /// Transition into `Ready`: log the session, open the gate, set the
    /// initial presence.
    async fn on_ready(&self, info: ReadyInfo) {
        *self.state.lock() = ConnectionState::Ready;
        info!(
            session = %info.session_name,
            guilds = info.guild_count,
            "Logged in and ready"
        );
        self.ready.notify();

        let status = render_presence(&self.presence_template, info.guild_count);
        if let Err(err) = self.gateway.set_presence(&status).await {
            warn!(error = %err, "Failed to set initial presence");
        }
    }

    /// Classifies a dispatch failure into exactly one reply, logging the
    /// detail.
    async fn report_failure(&self, channel: &ChannelId, err: &DispatchError) {
        match err {
            DispatchError::Handler { command, source } => {
                error!(command = %command, error = %source, "Command handler failed");
            }
            other => debug!(error = %other, "Command rejected"),
        }
        let text = self.classifier.classify(err);
        self.send_text(channel, text).await;
    }

    async fn send_text(&self, channel: &ChannelId, text: String) {
        if let Err(err) = self
            .gateway
            .send_response(channel, &OutgoingMessage::text(text))
            .await
        {
            error!(channel = %channel, error = %err, "Failed to deliver reply");
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("state", &self.state())
            .field("commands", &self.router.command_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::error::HandlerError;
    use crate::foundation::event::UserId;
    use crate::framework::router::CommandSpec;
    use crate::integration::gateway::{Gateway, GatewayResult};
    use async_trait::async_trait;

    #[derive(Default)]
    struct RecordingGateway {
        sent: Mutex<Vec<(ChannelId, OutgoingMessage)>>,
        presence: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Gateway for RecordingGateway {
        fn session_name(&self) -> &str {
            "herald-test"
        }

        async fn send_response(
            &self,
            channel: &ChannelId,
            message: &OutgoingMessage,
        ) -> GatewayResult<()> {
            self.sent.lock().push((channel.clone(), message.clone()));
            Ok(())
        }

        async fn set_presence(&self, status: &str) -> GatewayResult<()> {
            self.presence.lock().push(status.to_string());
            Ok(())
        }

        async fn guild_count(&self) -> GatewayResult<usize> {
            Ok(3)
        }
    }

    impl RecordingGateway {
        fn texts(&self) -> Vec<String> {
            self.sent
                .lock()
                .iter()
                .filter_map(|(_, m)| m.as_text().map(str::to_string))
                .collect()
        }
    }

    fn ready_event() -> GatewayEvent {
        GatewayEvent::Ready(ReadyInfo {
            session_name: "herald-test".into(),
            guild_count: 3,
        })
    }

    fn command(text: &str) -> GatewayEvent {
        GatewayEvent::CommandReceived {
            invoker: UserId::from("u1"),
            invoker_name: "tester".into(),
            raw_text: text.into(),
            channel: ChannelId::from("c1"),
        }
    }

    fn dispatcher_with(
        router: CommandRouter,
    ) -> (Arc<RecordingGateway>, EventDispatcher) {
        let gateway = Arc::new(RecordingGateway::default());
        let dispatcher = EventDispatcher::new(
            Arc::new(router),
            Arc::new(StateStore::new()),
            gateway.clone(),
            "Serving {count} servers",
        );
        (gateway, dispatcher)
    }

    fn router_with_ping() -> CommandRouter {
        let mut router = CommandRouter::new('!');
        router
            .register(
                None,
                CommandSpec::new("ping", "replies with pong", |ctx: InvocationContext| async move {
                    ctx.reply("Pong!").await?;
                    Ok(())
                }),
            )
            .unwrap();
        router
    }

    #[tokio::test]
    async fn test_commands_are_dropped_until_ready() {
        let (gateway, dispatcher) = dispatcher_with(router_with_ping());

        dispatcher.handle_event(command("!ping")).await;
        assert!(gateway.texts().is_empty());

        dispatcher.handle_event(GatewayEvent::Connecting).await;
        assert_eq!(dispatcher.state(), ConnectionState::Connecting);
        dispatcher.handle_event(command("!ping")).await;
        assert!(gateway.texts().is_empty());

        dispatcher.handle_event(ready_event()).await;
        dispatcher.handle_event(command("!ping")).await;
        assert_eq!(gateway.texts(), vec!["Pong!".to_string()]);
    }

    #[tokio::test]
    async fn test_ready_opens_the_gate_and_sets_initial_presence() {
        let (gateway, dispatcher) = dispatcher_with(router_with_ping());
        let mut gate = dispatcher.ready_gate();

        dispatcher.handle_event(ready_event()).await;

        assert_eq!(dispatcher.state(), ConnectionState::Ready);
        assert!(gate.wait().await);
        assert_eq!(*gateway.presence.lock(), ["Serving 3 servers"]);
    }

    #[tokio::test]
    async fn test_unknown_command_yields_exactly_one_reply() {
        let (gateway, dispatcher) = dispatcher_with(router_with_ping());
        dispatcher.handle_event(ready_event()).await;

        dispatcher.handle_event(command("!nosuchcommand")).await;

        let texts = gateway.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("`!help`"));
    }

    #[tokio::test]
    async fn test_missing_argument_reply_names_the_parameter() {
        let mut router = CommandRouter::new('!');
        router
            .register(
                None,
                CommandSpec::new("greet", "greets someone", |_ctx: InvocationContext| async {
                    Ok(())
                })
                .arg("who"),
            )
            .unwrap();
        let (gateway, dispatcher) = dispatcher_with(router);
        dispatcher.handle_event(ready_event()).await;

        dispatcher.handle_event(command("!greet")).await;

        let texts = gateway.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("`who`"));
    }

    #[tokio::test]
    async fn test_handler_failure_replies_once_and_keeps_dispatching() {
        let mut router = router_with_ping();
        router
            .register(
                None,
                CommandSpec::new("boom", "always fails", |_ctx: InvocationContext| async {
                    Err(HandlerError::msg("kaput"))
                }),
            )
            .unwrap();
        let (gateway, dispatcher) = dispatcher_with(router);
        dispatcher.handle_event(ready_event()).await;

        dispatcher.handle_event(command("!boom")).await;
        let texts = gateway.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("kaput"));

        // The process survives: the next command still dispatches.
        dispatcher.handle_event(command("!ping")).await;
        assert_eq!(gateway.texts().len(), 2);
    }

    #[tokio::test]
    async fn test_member_join_upserts_and_commands_count_messages() {
        let (_gateway, dispatcher) = dispatcher_with(router_with_ping());
        dispatcher.handle_event(ready_event()).await;

        dispatcher
            .handle_event(GatewayEvent::MemberJoined {
                user_id: UserId::from("u1"),
                display_name: "Ada".into(),
                joined_at: 1_700_000_000,
            })
            .await;

        let store = dispatcher.store();
        let record = store.get(&UserId::from("u1")).unwrap();
        assert_eq!(record.display_name, "Ada");
        assert_eq!(record.message_count, 0);

        dispatcher.handle_event(command("!ping")).await;
        assert_eq!(store.get(&UserId::from("u1")).unwrap().message_count, 1);
    }

    #[tokio::test]
    async fn test_connection_loss_suspends_processing() {
        let (gateway, dispatcher) = dispatcher_with(router_with_ping());
        dispatcher.handle_event(ready_event()).await;
        dispatcher.handle_event(command("!ping")).await;
        assert_eq!(gateway.texts().len(), 1);

        dispatcher
            .handle_event(GatewayEvent::ConnectionLost {
                reason: "socket closed".into(),
            })
            .await;
        assert_eq!(dispatcher.state(), ConnectionState::Disconnected);

        dispatcher.handle_event(command("!ping")).await;
        assert_eq!(gateway.texts().len(), 1);
    }

    #[tokio::test]
    async fn test_platform_handler_error_is_classified_and_replied() {
        let (gateway, dispatcher) = dispatcher_with(router_with_ping());
        dispatcher.handle_event(ready_event()).await;

        dispatcher
            .handle_event(GatewayEvent::HandlerError {
                description: "rate limited".into(),
                channel: Some(ChannelId::from("c1")),
            })
            .await;

        let texts = gateway.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("rate limited"));
    }

    #[test]
    fn test_render_presence_substitutes_count() {
        assert_eq!(
            render_presence("Serving {count} servers", 7),
            "Serving 7 servers"
        );
        assert_eq!(render_presence("online", 7), "online");
    }
}
