// File: worker/src/fetcher/provider.rs
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::response::ApifyRunResponse;
use crate::config::{ApifyConfig, ApifyCredentials};
use crate::database::{ServerMetrics, TrackedServer};
use crate::errors::FetchError;

/// One attempt at fetching metrics for a server. Retries live in `RemoteFetcher`.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    async fn request_metrics(&self, server: &TrackedServer) -> Result<ServerMetrics, FetchError>;
}

/// Runs the Discord scraping actor on Apify.
pub struct ApifyProvider {
    client: Client,
    runs_url: String,
    token: String,
}

impl ApifyProvider {
    pub fn new(config: &ApifyConfig, credentials: &ApifyCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client for Apify: {}", e))?;

        Ok(Self {
            client,
            runs_url: format!(
                "{}/v2/acts/{}/runs",
                config.api_base.trim_end_matches('/'),
                credentials.actor_id
            ),
            token: credentials.token.clone(),
        })
    }

    pub fn runs_url(&self) -> &str {
        &self.runs_url
    }
}

#[async_trait]
impl MetricsProvider for ApifyProvider {
    async fn request_metrics(&self, server: &TrackedServer) -> Result<ServerMetrics, FetchError> {
        let response = self
            .client
            .post(&self.runs_url)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&json!({
                "guildId": server.guild_id,
                "inviteCode": server.invite_code,
            }))
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = if body.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                body
            };
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Transport {
            reason: format!("failed to read response body: {}", e),
        })?;

        ApifyRunResponse::parse(&body)?.into_metrics()
    }
}
