//! Application wiring: configuration in, scheduled jobs out.

use crate::error::BotResult;
use crate::notifier::DiscordNotifier;
use crate::scheduler::{daily_cron, validate_cron_expression, weekly_cron, SchedulerService};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use txstats_config::{Config, ConfigLoader, ConfigValidator, SchedulingConfig};
use txstats_core::{
    publish_report, take_snapshot, Notifier, ReportSettings, SnapshotStore, StatsSource,
    TransifexClient,
};

/// Loads configuration from `path`, or from the environment when no path is given.
pub fn load_config(path: Option<&Path>) -> BotResult<Config> {
    let config = match path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    info!("Configuration loaded");
    Ok(config)
}

/// The two jobs together with everything they run against.
pub struct App {
    source: Arc<dyn StatsSource>,
    notifier: Arc<dyn Notifier>,
    store: SnapshotStore,
    settings: ReportSettings,
}

impl App {
    /// Assemble an application from its parts.
    pub fn new(
        source: Arc<dyn StatsSource>,
        notifier: Arc<dyn Notifier>,
        store: SnapshotStore,
        settings: ReportSettings,
    ) -> Self {
        Self {
            source,
            notifier,
            store,
            settings,
        }
    }

    /// Transifex client, Discord notifier and snapshot directory from `config`.
    pub fn from_config(config: &Config) -> BotResult<Self> {
        ConfigValidator::validate(config)?;

        let source = TransifexClient::new(&config.transifex)?;
        let notifier = DiscordNotifier::new(&config.discord);
        info!(
            "Posting reports to {} Discord channels",
            notifier.channels().len()
        );

        Ok(Self::new(
            Arc::new(source),
            Arc::new(notifier),
            SnapshotStore::new(&config.storage.output_dir),
            ReportSettings::from(&config.report),
        ))
    }

    /// Snapshot directory.
    pub const fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Takes today's (UTC) snapshot. Failures are logged; the next run retries.
    pub async fn run_daily_snapshot(&self) -> bool {
        let today = Utc::now().date_naive();
        match take_snapshot(self.source.as_ref(), &self.store, today).await {
            Ok(path) => {
                info!("Daily snapshot stored at {}", path.display());
                true
            }
            Err(e) => {
                error!("Daily snapshot failed: {}", e);
                false
            }
        }
    }

    /// Builds and posts the report. Failures are logged and nothing is sent.
    pub async fn run_weekly_report(&self) -> bool {
        match publish_report(&self.store, self.notifier.as_ref(), &self.settings).await {
            Ok(_) => true,
            Err(e) => {
                error!("Weekly report failed: {}", e);
                false
            }
        }
    }

    /// Registers both jobs on `scheduler`, or neither when a schedule is invalid.
    pub async fn schedule(
        self: &Arc<Self>,
        scheduler: &SchedulerService,
        scheduling: &SchedulingConfig,
    ) -> anyhow::Result<()> {
        let daily = daily_cron(scheduling.daily_time()?);
        let weekly = weekly_cron(scheduling.report_time()?, scheduling.report_weekday()?);
        for cron_expression in [&daily, &weekly] {
            anyhow::ensure!(
                validate_cron_expression(cron_expression),
                "Scheduler rejected cron expression '{cron_expression}'"
            );
        }

        let app = Arc::clone(self);
        scheduler
            .add_job(
                "daily-snapshot",
                daily,
                Some("Download translation statistics".to_string()),
                move || {
                    let app = Arc::clone(&app);
                    async move {
                        app.run_daily_snapshot().await;
                    }
                },
            )
            .await?;

        let app = Arc::clone(self);
        scheduler
            .add_job(
                "weekly-report",
                weekly,
                Some("Post translation progress report".to_string()),
                move || {
                    let app = Arc::clone(&app);
                    async move {
                        app.run_weekly_report().await;
                    }
                },
            )
            .await?;

        Ok(())
    }
}

/// Runs the scheduler until Ctrl-C.
pub async fn run_until_shutdown(app: Arc<App>, scheduling: &SchedulingConfig) -> anyhow::Result<()> {
    let scheduler = SchedulerService::new().await?;
    app.schedule(&scheduler, scheduling).await?;
    scheduler.start().await?;

    for job in scheduler.list_jobs().await {
        info!("Scheduled {} ({})", job.name, job.cron_expression);
    }

    if scheduling.run_on_startup {
        app.run_daily_snapshot().await;
    }

    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal, stopping scheduler");

    scheduler.stop().await
}
