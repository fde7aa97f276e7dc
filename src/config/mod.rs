// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::Result;

/// Build the configuration from the process environment.
///
/// All settings have defaults, so this only fails when a value is present
/// but malformed (e.g. a non-numeric `PORT`).
pub fn load_config() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
