//! Upstream metrics fetching
//!
//! Each tracked server is refreshed by running a Discord scraping actor on
//! Apify, one HTTP call per server.
//!
//! # Layers
//!
//! ```text
//! RemoteFetcher (retry + backoff)
//!    ↓
//! MetricsProvider (one attempt)  →  ApifyProvider → POST /v2/acts/{actor}/runs
//!    ↓
//! ApifyRunResponse (validated schema) → ServerMetrics | FetchError
//! ```

pub mod provider;
pub mod remote;
pub mod response;

pub use provider::{ApifyProvider, MetricsProvider};
pub use remote::{RemoteFetcher, RetryPolicy};
pub use response::ApifyRunResponse;
