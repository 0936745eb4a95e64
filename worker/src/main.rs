// File: worker/src/main.rs
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use discord_sync::config::ConfigManager;
use discord_sync::constants::{cleanup, defaults};
use discord_sync::cycle_tracker::{CycleTracker, CycleTrigger};
use discord_sync::database::Database;
use discord_sync::fetcher::{ApifyProvider, RemoteFetcher};
use discord_sync::scheduler::SyncScheduler;
use discord_sync::sync::{BatchCoordinator, CycleRunner, SyncOrchestrator};
use discord_sync::web::{start_web_server, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config_dir =
        std::env::var(defaults::CONFIG_DIR_ENV).unwrap_or_else(|_| defaults::CONFIG_DIR.to_string());

    // Configuration comes first so its log level can seed the filter
    let config_manager = ConfigManager::new(config_dir.clone())
        .await
        .with_context(|| format!("Failed to load configuration from {}", config_dir))?;
    let config = config_manager.get_current_config();

    let log_level = config.log_level.as_deref().unwrap_or("info");
    let env_filter = EnvFilter::from_default_env()
        .add_directive(format!("discord_sync={}", log_level).parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("tokio_cron_scheduler=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("sqlx=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting Discord Counter Worker");
    info!(
        "Configuration loaded from {}: schedule '{}', {} seed servers, actor {}",
        config_dir,
        config.sync_schedule,
        config.tracked_servers.len(),
        config.credentials.actor_id
    );

    // Initialize database
    let database = Arc::new(Database::new(&config.database_path).await?);
    info!("Database initialized at {}", config.database_path);

    for server in &config.tracked_servers {
        if let Err(e) = database.register_tracked_server(server).await {
            error!("Failed to register tracked server {}: {}", server.guild_id, e);
        }
    }
    if !config.tracked_servers.is_empty() {
        info!("Registered {} seed servers", config.tracked_servers.len());
    }

    // Build the sync pipeline bottom-up
    let provider = Arc::new(ApifyProvider::new(&config.apify, &config.credentials)?);
    info!("Apify provider initialized: {}", provider.runs_url());

    let fetcher = RemoteFetcher::new(provider, config.sync.retry_policy());
    let coordinator = BatchCoordinator::new(fetcher, config.sync.batch_policy());
    let orchestrator = Arc::new(SyncOrchestrator::new(database.clone(), coordinator));

    let tracker = CycleTracker::new();
    let runner = CycleRunner::new(orchestrator, tracker.clone());
    info!("Cycle runner initialized");

    // Release cycle guards left behind by a stuck cycle
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(
            cleanup::CLEANUP_INTERVAL_SECONDS,
        ));
        loop {
            interval.tick().await;
            if tracker.release_stale_cycle(cleanup::STALE_CYCLE_HOURS).await {
                warn!(
                    "Released a sync cycle guard older than {} hours",
                    cleanup::STALE_CYCLE_HOURS
                );
            }
        }
    });

    if config.run_on_startup {
        match runner.spawn_cycle(CycleTrigger::Startup).await {
            Ok(handle) => info!("Startup sync cycle {} started", handle.cycle_id()),
            Err(e) => warn!("Startup sync cycle not started: {}", e),
        }
    }

    // Start scheduler
    let scheduler = SyncScheduler::new(runner.clone(), config.sync_schedule.clone()).await?;
    scheduler.start().await?;
    info!("Sync scheduler started with schedule '{}'", config.sync_schedule);

    // Start web server
    let state = AppState::new(runner, database);
    info!("Starting web server on {}:{}", config.host, config.port);
    start_web_server(config, state).await?;

    Ok(())
}
