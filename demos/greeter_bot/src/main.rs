//! Greeter Bot Demo
//!
//! A self-contained demonstration of the Herald framework. Instead of a real
//! platform connection, a [`ScriptedGateway`] prints every outbound call and
//! a short scripted conversation is pushed through the event feed; the
//! runtime exits when the script ends.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package greeter-bot
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use herald::prelude::*;

// ============================================================================
// Scripted gateway
// ============================================================================

/// An in-process stand-in for the platform connection: outbound calls are
/// printed rather than sent anywhere.
struct ScriptedGateway {
    guilds: usize,
}

#[async_trait]
impl Gateway for ScriptedGateway {
    fn session_name(&self) -> &str {
        "greeter-demo"
    }

    async fn send_response(
        &self,
        channel: &ChannelId,
        message: &OutgoingMessage,
    ) -> GatewayResult<()> {
        match message {
            OutgoingMessage::Text { content } => println!("[{channel}] {content}"),
            OutgoingMessage::Embed { embed } => {
                println!("[{channel}] ── {} ──", embed.title);
                if !embed.description.is_empty() {
                    println!("[{channel}]   {}", embed.description);
                }
                for field in &embed.fields {
                    println!("[{channel}]   {}: {}", field.name, field.value);
                }
            }
        }
        Ok(())
    }

    async fn set_presence(&self, status: &str) -> GatewayResult<()> {
        println!("[presence] {status}");
        Ok(())
    }

    async fn guild_count(&self) -> GatewayResult<usize> {
        Ok(self.guilds)
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn hello(ctx: InvocationContext) -> HandlerResult {
    ctx.reply("Hello! my name is john. How can I help you?")
        .await?;
    Ok(())
}

async fn hi(ctx: InvocationContext) -> HandlerResult {
    ctx.reply("Hello! How can we render our service to you?")
        .await?;
    Ok(())
}

async fn util_ping(ctx: InvocationContext) -> HandlerResult {
    ctx.reply("Pong!").await?;
    Ok(())
}

// ============================================================================
// Scripted conversation
// ============================================================================

fn command(user: &str, name: &str, channel: &str, text: &str) -> GatewayEvent {
    GatewayEvent::CommandReceived {
        invoker: UserId::new(user),
        invoker_name: name.to_string(),
        raw_text: text.to_string(),
        channel: ChannelId::new(channel),
    }
}

async fn feed_script(tx: mpsc::Sender<GatewayEvent>) {
    let script = [
        GatewayEvent::Connecting,
        GatewayEvent::Ready(ReadyInfo {
            session_name: "greeter-demo".into(),
            guild_count: 2,
        }),
        GatewayEvent::MemberJoined {
            user_id: UserId::new("1001"),
            display_name: "Ada".into(),
            joined_at: 1_754_000_000,
        },
        command("1001", "Ada", "general", "!hello"),
        command("1002", "Grace", "general", "!hi"),
        command("1001", "Ada", "general", "!util ping"),
        command("1001", "Ada", "general", "!util serverinfo"),
        command("1001", "Ada", "general", "!whoami"),
        command("1002", "Grace", "general", "!greet"),
        command("1001", "Ada", "general", "!nosuchcommand"),
        command("1001", "Ada", "general", "!help"),
    ];

    for event in script {
        if tx.send(event).await.is_err() {
            return;
        }
        // Small gap so the printed conversation reads in order.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The demo injects its token programmatically; real deployments set
    // HERALD_TOKEN or `token` in herald.toml instead.
    let mut runtime = HeraldRuntime::builder()
        .merge(HeraldConfig {
            token: Some("demo-token".into()),
            ..Default::default()
        })
        .build()?;

    let store = runtime.store();

    runtime.command(CommandSpec::new("hello", "Say hello", hello))?;
    runtime.command(CommandSpec::new("hi", "Also say hello", hi))?;

    // Reads the shared state store.
    let members_store = Arc::clone(&store);
    runtime.command(CommandSpec::new(
        "members",
        "How many members are tracked",
        move |ctx: InvocationContext| {
            let store = Arc::clone(&members_store);
            async move {
                ctx.reply(format!("Tracking {} member(s).", store.count()))
                    .await?;
                Ok(())
            }
        },
    ))?;

    let whoami_store = Arc::clone(&store);
    runtime.command(CommandSpec::new(
        "whoami",
        "What the bot knows about you",
        move |ctx: InvocationContext| {
            let store = Arc::clone(&whoami_store);
            async move {
                match store.get(ctx.invoker()) {
                    Some(record) => {
                        let embed = Embed::new(record.display_name.clone())
                            .field("Joined", record.joined_at.to_string())
                            .field("Messages", record.message_count.to_string());
                        ctx.reply_message(&OutgoingMessage::embed(embed)).await?;
                    }
                    None => {
                        ctx.reply("I have no record of you yet.").await?;
                    }
                }
                Ok(())
            }
        },
    ))?;

    // Requires an argument, to show the missing-argument reply.
    runtime.command(
        CommandSpec::new(
            "greet",
            "Greet someone by name",
            |ctx: InvocationContext| async move {
                let who = ctx.arg(0).unwrap_or("stranger").to_string();
                ctx.reply(format!("Hello, {who}!")).await?;
                Ok(())
            },
        )
        .arg("who"),
    )?;

    runtime.group_command("util", CommandSpec::new("ping", "Pong", util_ping))?;
    runtime.group_command(
        "util",
        CommandSpec::new(
            "serverinfo",
            "Show server details",
            |ctx: InvocationContext| async move {
                let guilds = ctx.gateway().guild_count().await?;
                let embed = Embed::new("Server info")
                    .description("What the session can see right now")
                    .field("Servers", guilds.to_string());
                ctx.reply_message(&OutgoingMessage::embed(embed)).await?;
                Ok(())
            },
        ),
    )?;

    let gateway: BoxedGateway = Arc::new(ScriptedGateway { guilds: 2 });
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(feed_script(tx));

    runtime.run(gateway, rx).await?;

    info!("Script finished, demo over");
    Ok(())
}
