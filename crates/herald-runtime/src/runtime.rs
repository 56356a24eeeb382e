//! Main runtime orchestration.
//!
//! The [`HeraldRuntime`] wires the pieces of the dispatch core together:
//! it owns the command router during registration, builds the
//! [`EventDispatcher`] when started, spawns the ready-gated presence task,
//! and consumes the decoded event feed until shutdown.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use herald_runtime::HeraldRuntime;
//!
//! // Loads herald.toml / HERALD_* env; fails fast without a token
//! let mut runtime = HeraldRuntime::new()?;
//!
//! runtime.command(CommandSpec::new("hello", "Say hello", hello))?;
//! runtime.group_command("util", CommandSpec::new("ping", "Pong", ping))?;
//!
//! runtime.run(gateway, events).await?;
//! ```
//!
//! Each event from the feed is dispatched on its own task, so events from
//! different users may be processed concurrently; ordering within the feed
//! is the connection layer's property. A `help` command listing every
//! registered command is added automatically unless one is registered by
//! hand.

use std::future::Future;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use herald_core::{
    BoxedGateway, CommandRouter, CommandSpec, EventDispatcher, GatewayEvent, InvocationContext,
    ScheduledTask, StateStore, render_presence,
};

use crate::config::{ConfigLoader, HeraldConfig, PresenceConfig};
use crate::error::RuntimeResult;
use crate::logging;

/// The top-level runtime: registration surface plus the event loop.
#[derive(Debug)]
pub struct HeraldRuntime {
    config: HeraldConfig,
    router: CommandRouter,
    store: Arc<StateStore>,
}

impl HeraldRuntime {
    /// Creates a runtime with automatic configuration loading.
    ///
    /// Searches the current directory and the user config directory for
    /// `herald.toml`, then applies `HERALD_*` environment variables. Fails
    /// fast when the connection token is absent.
    pub fn new() -> RuntimeResult<Self> {
        let config = ConfigLoader::new()
            .with_current_dir()
            .with_user_config_dir()
            .load()?;
        Ok(Self::from_config(config))
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already validated configuration.
    ///
    /// Initializes logging from the configuration's logging section; safe
    /// when a subscriber is already installed.
    pub fn from_config(config: HeraldConfig) -> Self {
        logging::init_from_config(&config.logging);

        let router = CommandRouter::new(config.commands.prefix_char());

        info!(
            prefix = %config.commands.prefix,
            presence_interval_secs = config.presence.interval_secs,
            "Runtime initialized from configuration"
        );

        Self {
            config,
            router,
            store: Arc::new(StateStore::new()),
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &HeraldConfig {
        &self.config
    }

    /// Returns the shared state store handle.
    ///
    /// Handlers that read or write per-user state capture a clone of this
    /// at registration time.
    pub fn store(&self) -> Arc<StateStore> {
        Arc::clone(&self.store)
    }

    /// Registers a top-level command.
    ///
    /// Registration conflicts are startup errors and abort the build.
    pub fn command(&mut self, spec: CommandSpec) -> RuntimeResult<&mut Self> {
        self.router.register(None, spec)?;
        Ok(self)
    }

    /// Registers a command under a namespace.
    pub fn group_command(&mut self, namespace: &str, spec: CommandSpec) -> RuntimeResult<&mut Self> {
        self.router.register(Some(namespace), spec)?;
        Ok(self)
    }

    /// Runs the runtime until the event feed closes or a shutdown signal
    /// (Ctrl+C or SIGTERM) is received.
    pub async fn run(
        self,
        gateway: BoxedGateway,
        events: mpsc::Receiver<GatewayEvent>,
    ) -> RuntimeResult<()> {
        self.run_until(gateway, events, wait_for_shutdown()).await
    }

    /// Runs the runtime with a custom shutdown future.
    pub async fn run_until<F>(
        self,
        gateway: BoxedGateway,
        mut events: mpsc::Receiver<GatewayEvent>,
        shutdown: F,
    ) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let Self {
            config,
            mut router,
            store,
        } = self;

        // Auto-register `help` unless the application brought its own. The
        // text is rendered after registration closes so it lists itself.
        let help_text: Arc<OnceLock<String>> = Arc::new(OnceLock::new());
        if !router.contains(None, "help") {
            let slot = Arc::clone(&help_text);
            router.register(
                None,
                CommandSpec::new(
                    "help",
                    "List available commands",
                    move |ctx: InvocationContext| {
                        let slot = Arc::clone(&slot);
                        async move {
                            let text = slot
                                .get()
                                .cloned()
                                .unwrap_or_else(|| "No commands registered.".to_string());
                            ctx.reply(text).await?;
                            Ok(())
                        }
                    },
                ),
            )?;
        }

        let router = Arc::new(router);
        let _ = help_text.set(format!("Available commands:\n{}", router.render_help()));

        let dispatcher = Arc::new(EventDispatcher::new(
            router,
            store,
            Arc::clone(&gateway),
            config.presence.template.clone(),
        ));

        let cancel = CancellationToken::new();
        let presence_handle =
            spawn_presence_task(&config.presence, &dispatcher, &gateway, &cancel);

        info!("Herald runtime is now running");

        let mut inflight = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                event = events.recv() => match event {
                    // Commands and surfaced failures may suspend on reply
                    // I/O, so they run on their own tasks; lifecycle and
                    // membership events mutate shared state and are handled
                    // inline, in arrival order.
                    Some(event @ (GatewayEvent::CommandReceived { .. }
                        | GatewayEvent::HandlerError { .. })) => {
                        let dispatcher = Arc::clone(&dispatcher);
                        inflight.spawn(async move {
                            dispatcher.handle_event(event).await;
                        });
                    }
                    Some(event) => dispatcher.handle_event(event).await,
                    None => {
                        info!("Event feed closed");
                        break;
                    }
                },
                Some(result) = inflight.join_next(), if !inflight.is_empty() => {
                    if let Err(err) = result {
                        error!(error = %err, "Event task failed");
                    }
                }
            }
        }

        // Drain in-flight dispatches before tearing the scheduler down, so
        // every accepted event gets its reply.
        while let Some(result) = inflight.join_next().await {
            if let Err(err) = result {
                error!(error = %err, "Event task failed");
            }
        }

        cancel.cancel();
        presence_handle.await?;

        info!("Runtime stopped");
        Ok(())
    }
}

/// Spawns the ready-gated presence updater.
fn spawn_presence_task(
    presence: &PresenceConfig,
    dispatcher: &Arc<EventDispatcher>,
    gateway: &BoxedGateway,
    cancel: &CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let template = presence.template.clone();
    let gateway = Arc::clone(gateway);

    ScheduledTask::new(presence.interval())
        .timeout(presence.timeout())
        .spawn(dispatcher.ready_gate(), cancel.child_token(), move || {
            let gateway = Arc::clone(&gateway);
            let template = template.clone();
            async move { update_presence(&gateway, &template).await }
        })
}

/// One presence update cycle: fetch the guild count, render the template,
/// push the status line.
async fn update_presence(gateway: &BoxedGateway, template: &str) {
    match gateway.guild_count().await {
        Ok(count) => {
            let status = render_presence(template, count);
            debug!(status = %status, "Updating presence");
            if let Err(err) = gateway.set_presence(&status).await {
                warn!(error = %err, "Presence update failed");
            }
        }
        Err(err) => {
            warn!(error = %err, "Could not fetch guild count for presence update");
        }
    }
}

/// Resolves when the process receives a shutdown signal (Ctrl+C or SIGTERM).
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`HeraldRuntime`] with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = HeraldRuntime::builder()
///     .config_file("config/herald.toml")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            loader: ConfigLoader::new().with_current_dir(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.file(path);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.loader = self.loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.loader = self.loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: HeraldConfig) -> Self {
        self.loader = self.loader.merge(config);
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build(self) -> RuntimeResult<HeraldRuntime> {
        let config = self.loader.load()?;
        Ok(HeraldRuntime::from_config(config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use async_trait::async_trait;
    use herald_core::{
        ChannelId, Gateway, GatewayResult, OutgoingMessage, ReadyInfo, UserId,
    };
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingGateway {
        sent: Mutex<Vec<String>>,
        presence: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Gateway for RecordingGateway {
        fn session_name(&self) -> &str {
            "herald-test"
        }

        async fn send_response(
            &self,
            _channel: &ChannelId,
            message: &OutgoingMessage,
        ) -> GatewayResult<()> {
            if let Some(text) = message.as_text() {
                self.sent.lock().push(text.to_string());
            }
            Ok(())
        }

        async fn set_presence(&self, status: &str) -> GatewayResult<()> {
            self.presence.lock().push(status.to_string());
            Ok(())
        }

        async fn guild_count(&self) -> GatewayResult<usize> {
            Ok(2)
        }
    }

    fn test_config() -> HeraldConfig {
        HeraldConfig {
            token: Some("test-token".into()),
            ..Default::default()
        }
    }

    fn command(text: &str) -> GatewayEvent {
        GatewayEvent::CommandReceived {
            invoker: UserId::from("u1"),
            invoker_name: "tester".into(),
            raw_text: text.into(),
            channel: ChannelId::from("c1"),
        }
    }

    #[test]
    fn test_duplicate_registration_is_a_startup_error() {
        let mut runtime = HeraldRuntime::from_config(test_config());
        runtime
            .command(CommandSpec::new("hello", "hi", |_ctx: InvocationContext| async {
                Ok(())
            }))
            .unwrap();

        let err = runtime
            .command(CommandSpec::new("hello", "again", |_ctx: InvocationContext| async {
                Ok(())
            }))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Registry(_)));
    }

    #[tokio::test]
    async fn test_scripted_session_end_to_end() {
        let mut runtime = HeraldRuntime::from_config(test_config());
        runtime
            .command(CommandSpec::new(
                "hello",
                "Say hello",
                |ctx: InvocationContext| async move {
                    ctx.reply("Hello! my name is john. How can I help you?")
                        .await?;
                    Ok(())
                },
            ))
            .unwrap();
        runtime
            .group_command(
                "util",
                CommandSpec::new("ping", "Pong", |ctx: InvocationContext| async move {
                    ctx.reply("Pong!").await?;
                    Ok(())
                }),
            )
            .unwrap();

        let gateway = Arc::new(RecordingGateway::default());
        let (tx, rx) = mpsc::channel(16);

        tx.send(GatewayEvent::Connecting).await.unwrap();
        tx.send(GatewayEvent::Ready(ReadyInfo {
            session_name: "herald-test".into(),
            guild_count: 2,
        }))
        .await
        .unwrap();
        tx.send(command("!hello")).await.unwrap();
        tx.send(command("!util ping")).await.unwrap();
        tx.send(command("!help")).await.unwrap();
        drop(tx);

        runtime
            .run_until(gateway.clone(), rx, std::future::pending())
            .await
            .unwrap();

        let sent = gateway.sent.lock().clone();
        assert!(sent.iter().any(|m| m.contains("my name is john")));
        assert!(sent.iter().any(|m| m == "Pong!"));
        // The auto-registered help lists every command, itself included.
        let help = sent
            .iter()
            .find(|m| m.contains("Available commands"))
            .expect("help reply");
        assert!(help.contains("!hello"));
        assert!(help.contains("!util ping"));
        assert!(help.contains("!help"));

        // Initial presence was set on ready.
        assert_eq!(
            gateway.presence.lock().first().map(String::as_str),
            Some("Serving 2 servers")
        );
    }

    #[tokio::test]
    async fn test_user_supplied_help_wins_over_auto_registration() {
        let mut runtime = HeraldRuntime::from_config(test_config());
        runtime
            .command(CommandSpec::new(
                "help",
                "Custom help",
                |ctx: InvocationContext| async move {
                    ctx.reply("custom help text").await?;
                    Ok(())
                },
            ))
            .unwrap();

        let gateway = Arc::new(RecordingGateway::default());
        let (tx, rx) = mpsc::channel(16);
        tx.send(GatewayEvent::Ready(ReadyInfo {
            session_name: "herald-test".into(),
            guild_count: 2,
        }))
        .await
        .unwrap();
        tx.send(command("!help")).await.unwrap();
        drop(tx);

        runtime
            .run_until(gateway.clone(), rx, std::future::pending())
            .await
            .unwrap();

        let sent = gateway.sent.lock().clone();
        assert_eq!(sent, vec!["custom help text".to_string()]);
    }
}
