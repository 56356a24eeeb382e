//! Configuration loader using figment.
//!
//! Sources are merged in layers, later sources overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. Programmatic overrides ([`ConfigLoader::merge`])
//! 3. Configuration file (`herald.toml` / `config.toml`, searched in the
//!    current directory and the user config directory; requires the
//!    `toml-config` feature)
//! 4. Environment variables (`HERALD_*`)
//!
//! # Environment Variable Mapping
//!
//! Variables use the `HERALD_` prefix with `__` as the nesting separator:
//!
//! - `HERALD_TOKEN=xxx` → `token = "xxx"`
//! - `HERALD_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `HERALD_PRESENCE__INTERVAL_SECS=60` → `presence.interval_secs = 60`
//!
//! The loaded configuration is validated before it is returned; a missing
//! token is a startup failure, not a warning.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Serialized};
#[cfg(feature = "toml-config")]
use figment::providers::{Format, Toml};
use tracing::{debug, trace};

use super::error::{ConfigError, ConfigResult};
use super::schema::HeraldConfig;
use super::validation::validate_config;

/// Configuration loader with figment-based multi-source support.
///
/// # Example
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .with_current_dir()
///     .load()?;
/// ```
pub struct ConfigLoader {
    /// Base figment instance holding programmatic overrides.
    figment: Figment,
    /// Search paths for configuration files.
    search_paths: Vec<PathBuf>,
    /// Whether to load environment variables.
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds the current directory to the search paths.
    pub fn with_current_dir(self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            self.search_path(cwd)
        } else {
            self
        }
    }

    /// Adds the user config directory (`<config>/herald`) to the search
    /// paths.
    pub fn with_user_config_dir(self) -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            self.search_path(config_dir.join("herald"))
        } else {
            self
        }
    }

    /// Sets a specific configuration file to load instead of searching.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: HeraldConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads, merges, and validates the configuration.
    pub fn load(self) -> ConfigResult<HeraldConfig> {
        let figment = self.build_figment()?;

        let config: HeraldConfig = figment
            .extract()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        validate_config(&config)?;

        debug!(
            prefix = %config.commands.prefix,
            logging_level = %config.logging.level,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(HeraldConfig::default()));

        // Programmatic overrides sit below files and the environment.
        let overrides = std::mem::take(&mut self.figment);
        figment = figment.merge(overrides);

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            debug!(path = %path.display(), "Loading configuration file");
            figment = Self::merge_config_file(figment, path)?;
        } else {
            figment = self.search_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with HERALD_ prefix");
            figment = figment.merge(Env::prefixed("HERALD_").split("__"));
        }

        Ok(figment)
    }

    /// Merges a single config file, dispatching on file extension.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            _ => Err(ConfigError::Parse(format!(
                "unsupported or disabled configuration file format: .{ext}"
            ))),
        }
    }

    /// Searches the configured paths for the first matching config file.
    fn search_config_files(&self, figment: Figment) -> Figment {
        #[cfg(feature = "toml-config")]
        for search_path in &self.search_paths {
            for base_name in ["herald.toml", "config.toml"] {
                let path = search_path.join(base_name);
                if path.exists() {
                    debug!(path = %path.display(), "Loading configuration file");
                    return figment.merge(Toml::file(path));
                }
            }
        }
        figment
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_token_fail_fast() {
        let err = ConfigLoader::new().without_env().load().unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));
    }

    #[test]
    fn test_programmatic_token_satisfies_validation() {
        let config = ConfigLoader::new()
            .without_env()
            .merge(HeraldConfig {
                token: Some("secret".into()),
                ..Default::default()
            })
            .load()
            .unwrap();

        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.commands.prefix_char(), '!');
        assert_eq!(config.presence.interval_secs, 300);
    }

    #[test]
    fn test_env_token_and_nested_override() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("HERALD_TOKEN", "from-env");
            jail.set_env("HERALD_LOGGING__LEVEL", "debug");
            jail.set_env("HERALD_PRESENCE__INTERVAL_SECS", "60");

            let config = ConfigLoader::new().load().expect("config should load");
            assert_eq!(config.token.as_deref(), Some("from-env"));
            assert_eq!(config.logging.level.as_str(), "debug");
            assert_eq!(config.presence.interval_secs, 60);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = ConfigLoader::new()
            .without_env()
            .file("/definitely/not/here/herald.toml")
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_toml_file_layered_under_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "herald.toml",
                r#"
                    token = "from-file"

                    [commands]
                    prefix = "?"
                "#,
            )?;
            jail.set_env("HERALD_TOKEN", "from-env");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .expect("config should load");

            // Environment wins over the file; the file still supplies the rest.
            assert_eq!(config.token.as_deref(), Some("from-env"));
            assert_eq!(config.commands.prefix_char(), '?');
            Ok(())
        });
    }
}
