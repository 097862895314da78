//! Host configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section; every field has a default so an empty configuration is valid.

pub mod display;
pub mod led;
pub mod logging;
pub mod plugin;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use self::display::DisplayConfig;
pub use self::led::LedConfig;
pub use self::logging::LoggingConfig;
pub use self::plugin::PluginConfig;

use crate::error::HostError;

/// Root host configuration.
///
/// Deserialization target for `config/default.toml`, the environment
/// overlay `config/{env}.toml`, and `TANMATSU__*` environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Plugin lifecycle and table limits.
    #[serde(default)]
    pub plugins: PluginConfig,
    /// Status bar geometry.
    #[serde(default)]
    pub display: DisplayConfig,
    /// LED strip settings.
    #[serde(default)]
    pub leds: LedConfig,
}

impl HostConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `{dir}/default` with the `{dir}/{env}` overlay and environment
    /// variables prefixed with `TANMATSU__`. Missing files are skipped.
    pub fn load(dir: &str, env: &str) -> Result<Self, HostError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TANMATSU")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| HostError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| HostError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, HostError> {
        let loaded: Self = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Validate all sections.
    pub fn validate(&self) -> Result<(), HostError> {
        self.plugins.validate()?;
        self.display.validate()?;
        self.leds.validate()?;
        Ok(())
    }
}
