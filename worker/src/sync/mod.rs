//! Batched synchronization of Discord server metrics
//!
//! One cycle refreshes every tracked server:
//!
//! ```text
//! CycleRunner (one cycle at a time, detached task)
//!    ↓
//! SyncOrchestrator: load servers → fetch → persist → aggregates
//!    ↓
//! BatchCoordinator: groups of 10, concurrent inside a group, 30s between groups
//!    ↓
//! RemoteFetcher: 4 attempts, 2s/4s/8s backoff
//! ```
//!
//! A server whose fetch fails keeps its previous record. Per-server write
//! failures are counted in the report; failures to load the server list or to
//! write the hourly summary fail the whole cycle.

pub mod batch;
pub mod orchestrator;
pub mod runner;

pub use batch::{BatchCoordinator, BatchPolicy, BatchResults, FetchOutcome};
pub use orchestrator::{CycleReport, CycleState, SyncOrchestrator};
pub use runner::{CycleHandle, CycleOutcome, CycleRunner};
