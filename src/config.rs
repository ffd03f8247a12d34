//! Engine settings.
//!
//! Settings are read once per process from an optional `instrument_commands`
//! TOML file in the working directory, with `INSTRUMENT_COMMANDS_*`
//! environment variables layered on top. Every field has a default, and any
//! load failure falls back to the defaults with a logged warning, so the
//! engine never refuses to start over configuration.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::Deserialize;

/// Top-level engine settings.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Registry build-or-wait tuning.
    pub registry: RegistrySettings,
    /// Result encoding tuning.
    pub results: ResultSettings,
}

/// Settings for the per-type command registry.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistrySettings {
    /// Interval, in milliseconds, a waiting thread sleeps between polls
    /// while another thread builds the same type's command map.
    pub poll_interval_ms: u64,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        // Discovery can take hundreds of milliseconds; sleep, don't spin.
        Self {
            poll_interval_ms: 20,
        }
    }
}

/// Settings for result encoding.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResultSettings {
    /// Name given to an unnamed return value when the command declaration
    /// carries no override.
    pub default_result_name: String,
}

impl Default for ResultSettings {
    fn default() -> Self {
        Self {
            default_result_name: "Result".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the optional config file and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("instrument_commands").required(false))
            .add_source(Environment::with_prefix("INSTRUMENT_COMMANDS").separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// Process-wide settings instance, loaded lazily on first use.
pub fn settings() -> &'static Settings {
    static SETTINGS: Lazy<Settings> = Lazy::new(|| {
        Settings::load().unwrap_or_else(|err| {
            log::warn!("falling back to default engine settings: {err}");
            Settings::default()
        })
    });
    &SETTINGS
}
