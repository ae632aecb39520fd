//! Settings loading.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Built-in defaults
//! 2. An optional TOML/JSON/YAML file
//! 3. `BAZAAR__`-prefixed environment variables, `__` separating
//!    sections (`BAZAAR__API__BASE_URL`)

use std::path::Path;

use bazaar_domain::GuardSettings;
use config::{Config, Environment, File};
use tracing::debug;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "BAZAAR";

/// Error type for settings loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    /// A source could not be read or the result did not deserialize.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] config::ConfigError),
}

/// Loads settings from `path` (if any) and the environment.
///
/// # Errors
///
/// Returns an error if the file is missing or malformed, or if an
/// override has the wrong type.
pub fn load_settings(path: Option<&Path>) -> Result<GuardSettings, ConfigLoadError> {
    load_with_env(path, Environment::with_prefix(ENV_PREFIX))
}

fn load_with_env(path: Option<&Path>, env: Environment) -> Result<GuardSettings, ConfigLoadError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        debug!(path = %path.display(), "loading settings file");
        builder = builder.add_source(File::from(path).required(true));
    }

    let settings = builder
        .add_source(env.prefix_separator("__").separator("__").try_parsing(true))
        .build()?
        .try_deserialize::<GuardSettings>()?;
    Ok(settings)
}
