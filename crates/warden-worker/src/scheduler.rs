//! Cron scheduler for housekeeping tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use warden_core::config::worker::WorkerConfig;
use warden_core::error::AppError;

use crate::jobs::{CacheProbeJob, SessionSweepJob};

/// Cron-based scheduler for periodic background tasks.
pub struct CronScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// Cron expressions.
    config: WorkerConfig,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("config", &self.config)
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler.
    pub async fn new(config: WorkerConfig) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler, config })
    }

    /// Register the housekeeping tasks.
    pub async fn register_default_tasks(
        &self,
        sweep: SessionSweepJob,
        probe: CacheProbeJob,
    ) -> Result<(), AppError> {
        self.register_session_sweep(Arc::new(sweep)).await?;
        self.register_cache_probe(Arc::new(probe)).await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shut the scheduler down.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    async fn register_session_sweep(&self, job: Arc<SessionSweepJob>) -> Result<(), AppError> {
        let schedule = self.config.session_sweep_cron.as_str();
        let cron = CronJob::new_async(schedule, move |_uuid, _lock| {
            let job = Arc::clone(&job);
            Box::pin(async move {
                if let Err(e) = job.run().await {
                    tracing::error!(error = %e, "Session sweep failed");
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid session sweep schedule '{schedule}': {e}"))
        })?;

        self.scheduler.add(cron).await.map_err(|e| {
            AppError::internal(format!("Failed to add session sweep schedule: {e}"))
        })?;

        tracing::info!(schedule, "Registered: session_sweep");
        Ok(())
    }

    async fn register_cache_probe(&self, job: Arc<CacheProbeJob>) -> Result<(), AppError> {
        let schedule = self.config.cache_probe_cron.as_str();
        let cron = CronJob::new_async(schedule, move |_uuid, _lock| {
            let job = Arc::clone(&job);
            Box::pin(async move {
                job.run().await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid cache probe schedule '{schedule}': {e}"))
        })?;

        self.scheduler.add(cron).await.map_err(|e| {
            AppError::internal(format!("Failed to add cache probe schedule: {e}"))
        })?;

        tracing::info!(schedule, "Registered: cache_probe");
        Ok(())
    }
}
