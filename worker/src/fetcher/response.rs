//! Apify actor response schema.
//!
//! Every actor response goes through `ApifyRunResponse::into_metrics`. The
//! policy is strict: a response without a guild name or without either count
//! is invalid and retried, never defaulted to placeholder values.

use serde::Deserialize;
use serde_json::Value;

use crate::database::ServerMetrics;
use crate::errors::FetchError;

#[derive(Debug, Deserialize)]
pub struct ApifyRunResponse {
    pub data: Option<RunData>,
    /// The actor reports failures as a string, but anything non-null counts.
    pub error: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RunData {
    pub guild: Option<GuildInfo>,
    pub presence_count: Option<i64>,
    pub member_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct GuildInfo {
    pub name: Option<String>,
    pub icon: Option<String>,
}

impl ApifyRunResponse {
    pub fn parse(body: &str) -> Result<Self, FetchError> {
        serde_json::from_str(body).map_err(|e| FetchError::InvalidResponse {
            reason: format!("malformed body: {}", e),
        })
    }

    pub fn into_metrics(self) -> Result<ServerMetrics, FetchError> {
        if let Some(error) = self.error {
            let message = match error {
                Value::String(message) => message,
                other => other.to_string(),
            };
            return Err(FetchError::ActorError { message });
        }

        let data = self.data.ok_or_else(|| invalid("missing guild data"))?;
        let guild = data.guild.ok_or_else(|| invalid("missing guild data"))?;

        let name = guild
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| invalid("missing guild name"))?;

        Ok(ServerMetrics {
            name,
            icon: guild.icon,
            presence_count: count("presence_count", data.presence_count)?,
            member_count: count("member_count", data.member_count)?,
        })
    }
}

fn count(field: &str, value: Option<i64>) -> Result<u64, FetchError> {
    let value = value.ok_or_else(|| invalid(&format!("missing {}", field)))?;
    u64::try_from(value).map_err(|_| invalid(&format!("negative {}: {}", field, value)))
}

fn invalid(reason: &str) -> FetchError {
    FetchError::InvalidResponse {
        reason: reason.to_string(),
    }
}
