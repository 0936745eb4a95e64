//! Mock Apify server for testing the HTTP provider
//!
//! Serves `POST /v2/acts/{actor}/runs` and lets tests inspect what the
//! provider sent.

use discord_sync::config::{ApifyConfig, ApifyCredentials};
use discord_sync::fetcher::ApifyProvider;
use serde_json::Value;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use super::test_data::apify;

pub struct MockApifyServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockApifyServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    pub fn runs_path() -> String {
        format!("/v2/acts/{}/runs", apify::ACTOR_ID)
    }

    /// Provider pointed at this server with the test credentials
    pub fn provider(&self) -> ApifyProvider {
        let config = ApifyConfig {
            api_base: self.base_url.clone(),
            request_timeout_seconds: 5,
        };
        let credentials = ApifyCredentials {
            token: apify::TOKEN.to_string(),
            actor_id: apify::ACTOR_ID.to_string(),
        };
        ApifyProvider::new(&config, &credentials).expect("Failed to build Apify provider")
    }

    /// Answer every authenticated run with `body`
    pub async fn mock_run(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path(Self::runs_path()))
            .and(header("authorization", format!("Bearer {}", apify::TOKEN).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answer runs for one invite code with `body`
    pub async fn mock_run_for_invite(&self, invite_code: &str, body: Value) {
        Mock::given(method("POST"))
            .and(path(Self::runs_path()))
            .and(body_partial_json(serde_json::json!({ "inviteCode": invite_code })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status(&self, status_code: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path(Self::runs_path()))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_raw_body(&self, body: &str) {
        Mock::given(method("POST"))
            .and(path(Self::runs_path()))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Bodies of every request received so far
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|req| req.body_json::<Value>().ok())
            .collect()
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}
