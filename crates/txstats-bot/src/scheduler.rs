//! Scheduler service built on tokio-cron-scheduler
//!
//! Cron expressions use the six-field format (seconds first) and are
//! evaluated in UTC.

use anyhow::{Context, Result};
use chrono::{NaiveTime, Timelike, Weekday};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Job identifier, as handed out by tokio-cron-scheduler
pub type JobId = Uuid;

/// Cron expression firing every day at `time`.
pub fn daily_cron(time: NaiveTime) -> String {
    format!("0 {} {} * * *", time.minute(), time.hour())
}

/// Cron expression firing every `weekday` at `time`.
pub fn weekly_cron(time: NaiveTime, weekday: Weekday) -> String {
    format!("0 {} {} * * {}", time.minute(), time.hour(), weekday)
}

/// Whether `cron_expression` is accepted by the scheduler.
pub fn validate_cron_expression(cron_expression: &str) -> bool {
    Job::new(cron_expression, |_uuid, _scheduler| {}).is_ok()
}

/// Metadata kept for each scheduled job
#[derive(Debug, Clone)]
pub struct JobMetadata {
    /// Job identifier
    pub id: JobId,
    /// Human-readable name
    pub name: String,
    /// Cron expression the job runs on
    pub cron_expression: String,
    /// What the job does
    pub description: Option<String>,
}

/// Cron-based job scheduler
pub struct SchedulerService {
    scheduler: Arc<Mutex<JobScheduler>>,
    jobs: Arc<RwLock<HashMap<JobId, JobMetadata>>>,
    is_running: Arc<RwLock<bool>>,
}

impl SchedulerService {
    /// Create a stopped scheduler with no jobs
    pub async fn new() -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .context("Failed to create JobScheduler")?;

        debug!("JobScheduler created");

        Ok(Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            jobs: Arc::new(RwLock::new(HashMap::new())),
            is_running: Arc::new(RwLock::new(false)),
        })
    }

    /// Start firing scheduled jobs. Starting twice is a no-op.
    pub async fn start(&self) -> Result<()> {
        let mut is_running = self.is_running.write().await;
        if *is_running {
            warn!("Scheduler is already running");
            return Ok(());
        }

        let scheduler = self.scheduler.lock().await;
        scheduler.start().await.context("Failed to start scheduler")?;

        *is_running = true;
        info!("Scheduler started with {} jobs", self.jobs.read().await.len());
        Ok(())
    }

    /// Stop the scheduler. Stopping a stopped scheduler is a no-op.
    pub async fn stop(&self) -> Result<()> {
        let mut is_running = self.is_running.write().await;
        if !*is_running {
            warn!("Scheduler is not running");
            return Ok(());
        }

        let mut scheduler = self.scheduler.lock().await;
        scheduler
            .shutdown()
            .await
            .context("Failed to shutdown scheduler")?;

        *is_running = false;
        info!("Scheduler stopped");
        Ok(())
    }

    /// Schedule `job_fn` on `cron_expression`
    ///
    /// # Errors
    ///
    /// Returns an error if the cron expression is invalid or the job cannot be added.
    pub async fn add_job<F, Fut>(
        &self,
        name: impl Into<String>,
        cron_expression: impl Into<String>,
        description: Option<String>,
        job_fn: F,
    ) -> Result<JobId>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let cron_expression = cron_expression.into();
        info!("Adding job {} with cron '{}'", name, cron_expression);

        let job = Job::new_async(cron_expression.as_str(), move |_uuid, _scheduler| {
            let run = job_fn();
            Box::pin(async move {
                run.await;
            })
        })
        .with_context(|| format!("Invalid cron expression '{cron_expression}' for job {name}"))?;

        let job_id = {
            let scheduler = self.scheduler.lock().await;
            scheduler.add(job).await.context("Failed to add job to scheduler")?
        };

        self.jobs.write().await.insert(
            job_id,
            JobMetadata {
                id: job_id,
                name,
                cron_expression,
                description,
            },
        );

        Ok(job_id)
    }

    /// Metadata of all scheduled jobs
    pub async fn list_jobs(&self) -> Vec<JobMetadata> {
        self.jobs.read().await.values().cloned().collect()
    }
}
