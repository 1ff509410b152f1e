//! Configuration loading.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults ([`Settings::default`])
//! 2. an optional file, `config/default.{toml,yaml,json}` unless a path is given
//! 3. environment variables prefixed with `PUBSUB_`, e.g. `PUBSUB_SERVER_PORT`
//!
//! Command-line flags are applied on top by the binary.

mod settings;

use config::{Config, Environment, File};

pub use settings::{
    LogSettings, PartialLogSettings, PartialServerSettings, PartialSettings, ServerSettings,
    Settings,
};

use crate::utils::Result;

pub const DEFAULT_CONFIG_FILE: &str = "config/default";
pub const ENV_PREFIX: &str = "PUBSUB";

/// Loads settings from the default file location and the environment.
pub fn load_config() -> Result<Settings> {
    load_config_from(DEFAULT_CONFIG_FILE)
}

/// Loads settings using `path` as the (optional) configuration file.
pub fn load_config_from(path: &str) -> Result<Settings> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("_")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available, then merge with defaults
    let partial: PartialSettings = config.try_deserialize()?;
    Ok(Settings::default().merge(partial))
}
