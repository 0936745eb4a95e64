pub mod handlers;
pub mod server;

pub use server::{create_router, start_web_server};

use std::sync::Arc;

use crate::database::Database;
use crate::sync::CycleRunner;

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub runner: CycleRunner,
    pub database: Arc<Database>,
}

impl AppState {
    pub fn new(runner: CycleRunner, database: Arc<Database>) -> Self {
        Self { runner, database }
    }
}
