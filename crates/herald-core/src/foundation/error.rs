//! Error taxonomy for the dispatch core.
//!
//! Startup-time failures ([`RegistryError`]) are fatal and abort process
//! start. Runtime failures ([`DispatchError`]) are caught at the event
//! dispatcher boundary, classified into a user-facing reply, and never
//! terminate the process.

use thiserror::Error;

// =============================================================================
// Registration Errors
// =============================================================================

/// Errors raised while building the command registry.
///
/// These occur before the event loop starts and are treated as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two top-level commands claim the same name.
    #[error("duplicate top-level command '{name}'")]
    Duplicate {
        /// The contested command name.
        name: String,
    },

    /// Two commands claim the same name within one group.
    #[error("duplicate command '{name}' in group '{namespace}'")]
    DuplicateGrouped {
        /// The group the command was registered under.
        namespace: String,
        /// The contested command name.
        name: String,
    },

    /// A name is used both as a group and as a top-level command, which would
    /// make `<prefix><name> ...` ambiguous.
    #[error("name '{name}' is used both as a group and as a command")]
    GroupCommandClash {
        /// The contested name.
        name: String,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

// =============================================================================
// Handler Errors
// =============================================================================

/// A failure raised by a command handler body.
///
/// Handlers construct these from a message or from any underlying error; the
/// dispatcher logs the full chain and replies with classified text.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HandlerError {
    /// Creates a handler error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying error, keeping it as the source.
    pub fn from_err(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// The human-readable failure description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<crate::integration::gateway::GatewayError> for HandlerError {
    fn from(err: crate::integration::gateway::GatewayError) -> Self {
        Self::from_err(err)
    }
}

/// Result type returned by command handler bodies.
pub type HandlerResult = Result<(), HandlerError>;

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Structured failure produced by a single command dispatch.
///
/// Never panics across the dispatch boundary: the router returns one of these
/// and the dispatcher turns it into exactly one user-visible reply.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No registered command matched the invocation.
    #[error("unknown command '{name}'")]
    CommandNotFound {
        /// The group the lookup was scoped to, when the first token named one.
        namespace: Option<String>,
        /// The token that failed to resolve (empty for a bare group mention).
        name: String,
    },

    /// The payload supplied fewer arguments than the command requires.
    #[error("missing required argument '{param}' for command '{command}'")]
    MissingArgument {
        /// The resolved command name.
        command: String,
        /// The first required parameter that was not supplied.
        param: String,
    },

    /// The handler body failed after the command resolved.
    #[error("handler for '{command}' failed: {source}")]
    Handler {
        /// The resolved command name.
        command: String,
        /// The underlying handler failure.
        #[source]
        source: HandlerError,
    },
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
