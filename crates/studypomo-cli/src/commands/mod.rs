pub mod completions;
pub mod config;
pub mod run;
pub mod settings;

use studypomo_core::{Config, HttpSettingsGateway};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Settings gateway for the configured API.
pub fn gateway(config: &Config) -> Result<HttpSettingsGateway, Box<dyn std::error::Error>> {
    Ok(HttpSettingsGateway::new(
        &config.api.base_url,
        config.api.token.clone(),
    )?)
}
