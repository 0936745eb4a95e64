//! Temporary configuration directories for config loading tests

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A config directory holding `main.toml` and optionally `secrets.toml`,
/// removed when dropped.
pub struct TestConfigDir {
    dir: TempDir,
}

impl TestConfigDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp config dir"),
        }
    }

    pub fn with_main(self, contents: &str) -> Self {
        fs::write(self.dir.path().join("main.toml"), contents).expect("Failed to write main.toml");
        self
    }

    pub fn with_secrets(self, contents: &str) -> Self {
        fs::write(self.dir.path().join("secrets.toml"), contents)
            .expect("Failed to write secrets.toml");
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn path_str(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }
}

impl Default for TestConfigDir {
    fn default() -> Self {
        Self::new()
    }
}

pub const MINIMAL_MAIN: &str = r#"
host = "127.0.0.1"
port = 9000
"#;

pub const FULL_MAIN: &str = r#"
host = "127.0.0.1"
port = 9100
database_path = "/tmp/discord-test.db"
sync_schedule = "0 */30 * * * *"
run_on_startup = true
log_level = "debug"

[apify]
api_base = "http://localhost:9999"
request_timeout_seconds = 15

[sync]
batch_size = 5
batch_cooldown_seconds = 10
max_retries = 2
base_retry_delay_ms = 500

[[tracked_servers]]
guild_id = "123"
invite_code = "rust"

[[tracked_servers]]
guild_id = "456"
invite_code = "tokio"
"#;

pub const SECRETS: &str = r#"
[apify]
token = "file-token"
actor_id = "file-actor"
"#;
