//! Command registry and dispatch.
//!
//! This module provides the [`CommandRouter`], a two-level registry mapping
//! namespace to command name to [`CommandSpec`]. Top-level commands live in a
//! reserved empty-namespace bucket; grouped commands are addressed as
//! `<prefix><group> <name> ...`.
//!
//! # Dispatch
//!
//! 1. Text without the configured prefix is ignored (not addressed to the bot)
//! 2. The first token is matched against groups, then top-level commands,
//!    case-insensitively
//! 3. Required-argument arity is checked before the handler body runs
//! 4. Every failure comes back as a structured [`DispatchError`]; the router
//!    never panics across the dispatch boundary and never retries a handler
//!
//! ```rust,ignore
//! let mut router = CommandRouter::new('!');
//! router.register(None, CommandSpec::new("ping", "Measure latency", ping))?;
//! router.register(Some("util"), CommandSpec::new("ping", "Pong", util_ping))?;
//!
//! router.dispatch("!util ping", ctx).await?;
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{Instrument, Level, debug, span, trace};

use crate::foundation::context::InvocationContext;
use crate::foundation::error::{
    DispatchError, DispatchResult, HandlerError, RegistryError, RegistryResult,
};

/// Bucket key for commands registered without a namespace.
const ROOT: &str = "";

/// A type-erased handler future.
pub type HandlerFuture = BoxFuture<'static, Result<(), HandlerError>>;

/// An invokable command body.
///
/// Implemented automatically for async functions and closures taking an
/// [`InvocationContext`] and returning a handler result, so registration
/// reads naturally:
///
/// ```rust,ignore
/// async fn ping(ctx: InvocationContext) -> HandlerResult {
///     ctx.reply("Pong!").await?;
///     Ok(())
/// }
/// ```
pub trait CommandHandler: Send + Sync {
    /// Invokes the handler body.
    fn call(&self, ctx: InvocationContext) -> HandlerFuture;
}

impl<F, Fut> CommandHandler for F
where
    F: Fn(InvocationContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    fn call(&self, ctx: InvocationContext) -> HandlerFuture {
        Box::pin(self(ctx))
    }
}

/// A registered command: name, help line, declared required arguments, and
/// the handler to invoke.
///
/// Names are stored lowercase; matching is case-insensitive. Specs are
/// registered once at startup and immutable thereafter.
#[derive(Clone)]
pub struct CommandSpec {
    name: String,
    help_text: String,
    required_args: Vec<String>,
    handler: Arc<dyn CommandHandler>,
}

impl CommandSpec {
    /// Creates a spec for the given name and help line.
    pub fn new(
        name: impl Into<String>,
        help_text: impl Into<String>,
        handler: impl CommandHandler + 'static,
    ) -> Self {
        Self {
            name: name.into().to_lowercase(),
            help_text: help_text.into(),
            required_args: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    /// Declares a required positional parameter, in order.
    ///
    /// Invocations supplying fewer tokens than declared parameters fail with
    /// `MissingArgument` naming the first one not supplied, before the
    /// handler body executes.
    pub fn arg(mut self, param: impl Into<String>) -> Self {
        self.required_args.push(param.into());
        self
    }

    /// The lowercase command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The one-line help text.
    pub fn help_text(&self) -> &str {
        &self.help_text
    }

    /// The declared required parameter names, in order.
    pub fn required_args(&self) -> &[String] {
        &self.required_args
    }
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("required_args", &self.required_args)
            .finish()
    }
}

/// What a successful dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A handler ran to completion.
    Completed,
    /// The text was not addressed to the bot; nothing ran.
    Ignored,
}

/// The two-level command registry.
///
/// Owns every [`CommandSpec`]; built by registration calls before the event
/// loop starts, after which dispatch is a pure lookup.
pub struct CommandRouter {
    prefix: char,
    groups: HashMap<String, HashMap<String, CommandSpec>>,
}

impl CommandRouter {
    /// Creates an empty router with the given command prefix character.
    pub fn new(prefix: char) -> Self {
        let mut groups = HashMap::new();
        groups.insert(ROOT.to_string(), HashMap::new());
        Self { prefix, groups }
    }

    /// The configured prefix character.
    pub fn prefix(&self) -> char {
        self.prefix
    }

    /// Registers a command, optionally under a namespace.
    ///
    /// Fails with a [`RegistryError`] when the (namespace, name) pair is
    /// already taken, or when the registration would make a name ambiguous
    /// between a group and a top-level command. A failed registration never
    /// replaces the existing spec.
    pub fn register(&mut self, namespace: Option<&str>, spec: CommandSpec) -> RegistryResult<()> {
        match namespace {
            Some(ns) => {
                let ns = ns.to_lowercase();
                if self.top_level(&ns).is_some() {
                    return Err(RegistryError::GroupCommandClash { name: ns });
                }
                let group = self.groups.entry(ns.clone()).or_default();
                if group.contains_key(spec.name()) {
                    return Err(RegistryError::DuplicateGrouped {
                        namespace: ns,
                        name: spec.name().to_string(),
                    });
                }
                debug!(namespace = %ns, command = %spec.name(), "Registered command");
                group.insert(spec.name().to_string(), spec);
            }
            None => {
                if self.groups.contains_key(spec.name()) && spec.name() != ROOT {
                    return Err(RegistryError::GroupCommandClash {
                        name: spec.name().to_string(),
                    });
                }
                if self.top_level(spec.name()).is_some() {
                    return Err(RegistryError::Duplicate {
                        name: spec.name().to_string(),
                    });
                }
                debug!(command = %spec.name(), "Registered command");
                let name = spec.name().to_string();
                self.groups
                    .entry(ROOT.to_string())
                    .or_default()
                    .insert(name, spec);
            }
        }
        Ok(())
    }

    /// Whether a (namespace, name) pair is already registered.
    pub fn contains(&self, namespace: Option<&str>, name: &str) -> bool {
        let name = name.to_lowercase();
        match namespace {
            Some(ns) => self
                .groups
                .get(&ns.to_lowercase())
                .is_some_and(|group| group.contains_key(&name)),
            None => self.top_level(&name).is_some(),
        }
    }

    /// Number of registered commands across every bucket.
    pub fn command_count(&self) -> usize {
        self.groups.values().map(HashMap::len).sum()
    }

    /// Renders a sorted help listing from every registered spec.
    pub fn render_help(&self) -> String {
        let mut lines = Vec::with_capacity(self.command_count());
        for (ns, group) in &self.groups {
            for spec in group.values() {
                let qualified = if ns == ROOT {
                    format!("{}{}", self.prefix, spec.name())
                } else {
                    format!("{}{} {}", self.prefix, ns, spec.name())
                };
                let params: String = spec
                    .required_args()
                    .iter()
                    .map(|p| format!(" <{p}>"))
                    .collect();
                lines.push(format!("{qualified}{params} - {}", spec.help_text()));
            }
        }
        lines.sort();
        lines.join("\n")
    }

    /// Resolves and invokes the command named by `raw_text`.
    ///
    /// Returns [`Outcome::Ignored`] for text not carrying the prefix, and a
    /// structured [`DispatchError`] for every failure. One invocation, one
    /// outcome; a failed handler is not retried.
    pub async fn dispatch(
        &self,
        raw_text: &str,
        ctx: InvocationContext,
    ) -> DispatchResult<Outcome> {
        let Some(after_prefix) = raw_text.trim().strip_prefix(self.prefix) else {
            trace!("Text without command prefix, ignoring");
            return Ok(Outcome::Ignored);
        };

        let (head, rest) = split_token(after_prefix);
        if head.is_empty() {
            return Ok(Outcome::Ignored);
        }
        let head_lc = head.to_lowercase();

        let span = span!(Level::DEBUG, "dispatch", command = %head_lc);

        // Groups shadow nothing: registration guarantees a name is never both
        // a group and a top-level command.
        if let Some(group) = self.groups.get(&head_lc)
            && head_lc != ROOT
        {
            let (sub, payload) = split_token(rest);
            let Some(spec) = group.get(&sub.to_lowercase()) else {
                return Err(DispatchError::CommandNotFound {
                    namespace: Some(head_lc.clone()),
                    name: sub.to_string(),
                });
            };
            return self.invoke(spec, payload, ctx).instrument(span).await;
        }

        let Some(spec) = self.top_level(&head_lc) else {
            return Err(DispatchError::CommandNotFound {
                namespace: None,
                name: head.to_string(),
            });
        };
        self.invoke(spec, rest, ctx).instrument(span).await
    }

    /// Arity-checks the payload, then runs the handler body once.
    async fn invoke(
        &self,
        spec: &CommandSpec,
        payload: &str,
        ctx: InvocationContext,
    ) -> DispatchResult<Outcome> {
        let supplied = payload.split_whitespace().count();
        if supplied < spec.required_args().len() {
            return Err(DispatchError::MissingArgument {
                command: spec.name().to_string(),
                param: spec.required_args()[supplied].clone(),
            });
        }

        trace!(command = %spec.name(), "Invoking handler");
        match spec.handler.call(ctx.with_args(payload)).await {
            Ok(()) => Ok(Outcome::Completed),
            Err(source) => Err(DispatchError::Handler {
                command: spec.name().to_string(),
                source,
            }),
        }
    }

    fn top_level(&self, name: &str) -> Option<&CommandSpec> {
        self.groups.get(ROOT).and_then(|bucket| bucket.get(name))
    }
}

impl std::fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRouter")
            .field("prefix", &self.prefix)
            .field("command_count", &self.command_count())
            .finish()
    }
}

/// Splits off the first whitespace-separated token, returning it and the
/// remaining text with leading whitespace stripped.
fn split_token(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(at) => (&text[..at], text[at..].trim_start()),
        None => (text, ""),
    }
}
