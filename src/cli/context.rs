//! Shared command context for CLI commands

use gatekeep::config::{Config, load_config};
use gatekeep::error::Result;
use gatekeep::platform::{PlatformService, create_platform_service};
use std::path::Path;

/// Shared context for CLI commands that talk to GitHub
///
/// Configuration is passed explicitly to the engine from here; nothing is
/// kept in global state.
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
    /// Platform service (GitHub)
    pub platform: Box<dyn PlatformService>,
}

impl CommandContext {
    /// Load configuration and create the platform service
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config(config_path)?;
        let platform = create_platform_service(&config.github).await?;
        Ok(Self { config, platform })
    }
}
