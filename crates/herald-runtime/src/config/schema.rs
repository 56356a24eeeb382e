//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HeraldConfig {
    /// Connection credential for the platform session.
    ///
    /// Required at startup; usually supplied via the `HERALD_TOKEN`
    /// environment variable rather than the config file.
    #[serde(default)]
    pub token: Option<String>,

    /// Command parsing settings.
    #[serde(default)]
    pub commands: CommandsConfig,

    /// Presence update settings.
    #[serde(default)]
    pub presence: PresenceConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command parsing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// The command prefix; must be exactly one character.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl CommandsConfig {
    /// The prefix as a character.
    pub fn prefix_char(&self) -> char {
        self.prefix.chars().next().unwrap_or('!')
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> String {
    "!".to_string()
}

/// Presence update settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Seconds between periodic presence updates.
    #[serde(default = "default_presence_interval_secs")]
    pub interval_secs: u64,

    /// Bound on a single presence update; an update exceeding this is
    /// abandoned and that cycle skipped.
    #[serde(default = "default_presence_timeout_secs")]
    pub timeout_secs: u64,

    /// Status text template; `{count}` expands to the current guild count.
    #[serde(default = "default_presence_template")]
    pub template: String,
}

impl PresenceConfig {
    /// The update cadence as a duration.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// The per-update bound as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_presence_interval_secs(),
            timeout_secs: default_presence_timeout_secs(),
            template: default_presence_template(),
        }
    }
}

fn default_presence_interval_secs() -> u64 {
    300
}

fn default_presence_timeout_secs() -> u64 {
    30
}

fn default_presence_template() -> String {
    "Serving {count} servers".to_string()
}

/// Log verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level (default).
    #[default]
    Info,
    /// Warn level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// The lowercase level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line compact output (default).
    #[default]
    Compact,
    /// Standard fmt output.
    Full,
    /// Multi-line human-oriented output.
    Pretty,
    /// Newline-delimited JSON; requires the `json-log` feature.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard output (default).
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
    /// A log file; see [`LoggingConfig::file_path`].
    File,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Base log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,

    /// Destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Target file when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Include thread ids in log lines.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include file and line number in log lines.
    #[serde(default)]
    pub file_location: bool,

    /// Per-module level overrides, e.g. `herald_core = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}
