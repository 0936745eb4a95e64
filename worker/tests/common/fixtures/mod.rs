//! This module provides reusable test utilities:
//! - Scripted metrics providers and an in-memory store for the sync pipeline
//! - Mock Apify server
//! - Test configuration directories
//! - In-memory test databases
//! - Common test data

// Allow unused code in test fixtures - each test binary uses a subset
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod memory_store;
pub mod mock_apify;
pub mod scripted_provider;
pub mod test_config;
pub mod test_data;
pub mod test_database;

// Re-export commonly used items
pub use memory_store::{FailingStore, MemoryStore};
pub use mock_apify::MockApifyServer;
pub use scripted_provider::ScriptedProvider;
pub use test_config::TestConfigDir;
pub use test_data::*;
pub use test_database::TestDatabase;
