//! HTTP request handlers for the worker API.
//!
//! - `common` - Shared response envelope and query structs
//! - `sync` - Health check, manual trigger and sync status
//! - `servers` - Read-only server records and history

pub mod common;
pub mod servers;
pub mod sync;

pub use servers::*;
pub use sync::*;
