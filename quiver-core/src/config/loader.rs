use crate::config::model::Config;
use anyhow::Context;

pub fn load_config() -> Result<Config, anyhow::Error> {
    load_config_from_path("quiver.toml")
}

pub fn load_config_from_path(config_path: &str) -> Result<Config, anyhow::Error> {
    let config_str = std::fs::read_to_string(config_path)
        .with_context(|| format!("failed to read config file '{}'", config_path))?;
    let config: Config = toml::from_str(&config_str)
        .with_context(|| format!("failed to parse config file '{}'", config_path))?;
    tracing::debug!(
        "Loaded config from {} with {} pools",
        config_path,
        config.pools.len()
    );
    Ok(config)
}
