// File: worker/src/scheduler/sync_job.rs
use anyhow::{anyhow, Result};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, instrument, warn};

use crate::cycle_tracker::CycleTrigger;
use crate::errors::SyncError;
use crate::sync::CycleRunner;

pub struct SyncScheduler {
    runner: CycleRunner,
    schedule: String,
    scheduler: JobScheduler,
}

impl SyncScheduler {
    pub async fn new(runner: CycleRunner, schedule: String) -> Result<Self> {
        validate_6_field_cron(&schedule)
            .map_err(|e| anyhow!("Invalid 6-field cron schedule '{}': {}", schedule, e))?;

        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow!("Failed to create JobScheduler: {}", e))?;

        Ok(Self {
            runner,
            schedule,
            scheduler,
        })
    }

    #[instrument(skip(self), fields(schedule = %self.schedule))]
    pub async fn start(&self) -> Result<()> {
        let runner = self.runner.clone();

        let job = Job::new_async(self.schedule.as_str(), move |_uuid, _scheduler| {
            let runner = runner.clone();
            Box::pin(async move {
                trigger_scheduled_cycle(&runner).await;
            })
        })
        .map_err(|e| anyhow!("Failed to create sync job for '{}': {}", self.schedule, e))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| anyhow!("Failed to add sync job to scheduler: {}", e))?;

        self.scheduler
            .start()
            .await
            .map_err(|e| anyhow!("Failed to start scheduler: {}", e))?;

        info!("✓ Sync scheduler started: {}", self.schedule);
        Ok(())
    }
}

/// Start a detached cycle and log its outcome once it completes. Returns
/// without waiting for the cycle.
pub async fn trigger_scheduled_cycle(runner: &CycleRunner) {
    info!("⏰ Scheduled sync triggered");

    let handle = match runner.spawn_cycle(CycleTrigger::Scheduled).await {
        Ok(handle) => handle,
        Err(SyncError::CycleInProgress { cycle_id }) => {
            warn!("Skipping scheduled sync: cycle {} is still running", cycle_id);
            return;
        }
        Err(e) => {
            error!("Failed to start scheduled sync: {}", e);
            return;
        }
    };

    tokio::spawn(async move {
        let cycle_id = handle.cycle_id().to_string();
        match handle.wait().await {
            Ok(report) => info!(
                "✓ Scheduled sync {} finished: {} updated, {} failed, {} total",
                cycle_id, report.success_count, report.error_count, report.total_count
            ),
            Err(e) => error!("✗ Scheduled sync {} failed: {}", cycle_id, e),
        }
    });
}

/// tokio-cron-scheduler expects `sec min hour day month dow`.
pub fn validate_6_field_cron(schedule: &str) -> Result<()> {
    let parts: Vec<&str> = schedule.split_whitespace().collect();

    if parts.len() != 6 {
        return Err(anyhow!(
            "expected 6 fields (second minute hour day month dayofweek), got {}: '{}'",
            parts.len(),
            schedule
        ));
    }

    let limits = [
        ("second", 0, 59),
        ("minute", 0, 59),
        ("hour", 0, 23),
        ("day", 1, 31),
        ("month", 1, 12),
        ("dayofweek", 0, 7),
    ];

    for (field, (name, min, max)) in parts.iter().zip(limits) {
        validate_cron_field(field, name, min, max)?;
    }

    Ok(())
}

fn validate_cron_field(field: &str, name: &str, min: u32, max: u32) -> Result<()> {
    if field == "*" || field == "?" {
        return Ok(());
    }

    if let Some(step) = field.strip_prefix("*/") {
        let step = step
            .parse::<u32>()
            .map_err(|_| anyhow!("Invalid {} step value: {}", name, step))?;
        if step == 0 {
            return Err(anyhow!("{} step value cannot be 0", name));
        }
        return Ok(());
    }

    let in_range = |value: &str| -> Result<()> {
        let parsed = value
            .parse::<u32>()
            .map_err(|_| anyhow!("Invalid {} value: {}", name, value))?;
        if parsed < min || parsed > max {
            return Err(anyhow!(
                "{} value {} is outside valid range {}-{}",
                name,
                parsed,
                min,
                max
            ));
        }
        Ok(())
    };

    for part in field.split(',') {
        match part.split_once('-') {
            Some((start, end)) => {
                in_range(start)?;
                in_range(end)?;
            }
            None => in_range(part)?,
        }
    }

    Ok(())
}
