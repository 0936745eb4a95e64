// File: worker/src/config/manager.rs
use super::secrets::SecretsLoader;
use super::Config;
use crate::errors::ConfigError;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: String) -> Result<Self> {
        let config = Self::load_configuration(&config_dir, |var| std::env::var(var).ok()).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    /// Load `main.toml` and `secrets.toml` from `config_dir`, resolving
    /// credentials through `env` first.
    pub async fn load_configuration<F>(config_dir: &str, env: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let main_config_path = format!("{}/main.toml", config_dir);
        let main_config_content =
            fs::read_to_string(&main_config_path)
                .await
                .map_err(|e| ConfigError::LoadFailed {
                    path: main_config_path.clone(),
                    reason: e.to_string(),
                })?;

        let mut config: Config =
            toml::from_str(&main_config_content).map_err(|e| ConfigError::ParseError {
                reason: format!("{}: {}", main_config_path, e),
            })?;

        let secrets_path = format!("{}/secrets.toml", config_dir);
        debug!("Loading secrets: {}", secrets_path);
        let secrets = SecretsLoader::load(Path::new(&secrets_path))?;
        config.credentials = secrets.resolve_credentials(env);

        config.validate()?;
        Ok(config)
    }
}
