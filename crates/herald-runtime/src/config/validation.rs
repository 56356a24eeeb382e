//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::HeraldConfig;

/// Validates the entire configuration.
///
/// Run after loading and before the runtime starts; any error here is fatal.
pub fn validate_config(config: &HeraldConfig) -> ConfigResult<()> {
    validate_token(config)?;
    validate_commands(config)?;
    validate_presence(config)?;
    Ok(())
}

/// The token must be present and non-empty.
fn validate_token(config: &HeraldConfig) -> ConfigResult<()> {
    match &config.token {
        Some(token) if !token.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::MissingToken),
    }
}

/// The command prefix must be exactly one character.
fn validate_commands(config: &HeraldConfig) -> ConfigResult<()> {
    let prefix = &config.commands.prefix;
    if prefix.chars().count() != 1 {
        return Err(ConfigError::validation(format!(
            "command prefix must be exactly one character, got {prefix:?}"
        )));
    }
    Ok(())
}

/// Presence cadence must be positive and the per-update bound must fit
/// inside one cycle.
fn validate_presence(config: &HeraldConfig) -> ConfigResult<()> {
    let presence = &config.presence;
    if presence.interval_secs == 0 {
        return Err(ConfigError::validation(
            "presence interval must be greater than 0",
        ));
    }
    if presence.timeout_secs == 0 {
        return Err(ConfigError::validation(
            "presence update timeout must be greater than 0",
        ));
    }
    if presence.timeout_secs >= presence.interval_secs {
        return Err(ConfigError::validation(
            "presence update timeout must be shorter than the interval",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_token() -> HeraldConfig {
        HeraldConfig {
            token: Some("secret".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_with_token_are_valid() {
        assert!(validate_config(&config_with_token()).is_ok());
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let config = HeraldConfig::default();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingToken)
        ));

        let config = HeraldConfig {
            token: Some("   ".into()),
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn test_multi_character_prefix_is_rejected() {
        let mut config = config_with_token();
        config.commands.prefix = "!!".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation(_))
        ));

        config.commands.prefix = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_presence_bounds_are_checked() {
        let mut config = config_with_token();
        config.presence.interval_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = config_with_token();
        config.presence.timeout_secs = config.presence.interval_secs;
        assert!(validate_config(&config).is_err());
    }
}
