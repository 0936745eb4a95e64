// File: worker/src/config/secrets.rs
//! Secrets loader for the Apify credentials.
//!
//! Secrets are stored in a separate TOML file (config/secrets.toml) that should
//! be excluded from version control. `APIFY_TOKEN` and `APIFY_ACTOR_ID` in the
//! environment take precedence over the file.
//!
//! Example secrets.toml:
//! ```toml
//! [apify]
//! token = "apify_api_xxx"
//! actor_id = "someone~discord-server-info"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use super::ApifyCredentials;
use crate::constants::apify;

/// Structure matching the secrets.toml file format
#[derive(Debug, Deserialize, Default)]
pub struct SecretsFile {
    #[serde(default)]
    pub apify: ApifySecrets,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApifySecrets {
    pub token: Option<String>,
    pub actor_id: Option<String>,
}

/// Loader for secrets from the secrets.toml file
pub struct SecretsLoader {
    secrets: SecretsFile,
}

impl SecretsLoader {
    /// Load secrets from the specified file path.
    /// Returns an empty loader if the file doesn't exist.
    pub fn load(secrets_path: &Path) -> Result<Self> {
        if !secrets_path.exists() {
            warn!(
                "Secrets file not found at {:?}, credentials must come from the environment",
                secrets_path
            );
            return Ok(Self {
                secrets: SecretsFile::default(),
            });
        }

        let content = std::fs::read_to_string(secrets_path)
            .with_context(|| format!("Failed to read secrets file: {:?}", secrets_path))?;

        let secrets: SecretsFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse secrets file: {:?}", secrets_path))?;

        info!("Loaded secrets from {:?}", secrets_path);

        Ok(Self { secrets })
    }

    /// Resolve credentials, preferring values returned by `env`.
    /// Missing values resolve to empty strings and are rejected by `Config::validate`.
    pub fn resolve_credentials<F>(&self, env: F) -> ApifyCredentials
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |var: &str, file_value: &Option<String>| {
            env(var)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| file_value.clone())
                .unwrap_or_default()
        };

        ApifyCredentials {
            token: pick(apify::TOKEN_ENV, &self.secrets.apify.token),
            actor_id: pick(apify::ACTOR_ID_ENV, &self.secrets.apify.actor_id),
        }
    }
}
