//! Application service: configuration use-cases.

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::TfprobeConfig;

/// Load configuration, rejecting any value `config set` would refuse.
pub fn load_config(store: &impl ConfigStore) -> Result<TfprobeConfig> {
    let config = store.load()?;
    config.validate().with_context(|| match store.path() {
        Ok(path) => format!("invalid configuration in {}", path.display()),
        Err(_) => "invalid configuration".to_string(),
    })?;
    Ok(config)
}

/// Validate and persist a single setting. Returns the updated configuration.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<TfprobeConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;
    Ok(config)
}
