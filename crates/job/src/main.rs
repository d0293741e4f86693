mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use nudge_core::config::{self, Config};
use nudge_job::health::HealthServer;
use nudge_job::{JobResult, JobRunner};
use nudge_notify::{DryRunNotifier, Notifier, TwilioNotifier};
use nudge_storage::MySqlHabitStore;

use crate::cli::{Cli, Command};

/// Exit status for configuration errors and runs aborted before users
/// could be evaluated.
const EXIT_ABORTED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.command() == Command::Healthcheck {
        println!("OK");
        return ExitCode::SUCCESS;
    }

    config::load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::log_level_from_env())),
        )
        .with_target(false)
        .init();

    match run(&cli).await {
        Ok(result) => ExitCode::from(result.exit_code()),
        Err(e) => {
            error!("run aborted: {e:#}");
            ExitCode::from(EXIT_ABORTED)
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<JobResult> {
    let mut config = Config::from_env().context("invalid configuration")?;
    cli.apply(&mut config.job);
    config.log_summary();

    let health = match config.health.addr.as_deref() {
        Some(addr) => match HealthServer::spawn(addr).await {
            Ok(server) => Some(server),
            Err(e) => {
                warn!(addr, error = %e, "health server could not bind, continuing without it");
                None
            }
        },
        None => None,
    };

    let result = execute(&config).await;

    if let Some(server) = health {
        server.shutdown().await;
    }
    result
}

async fn execute(config: &Config) -> anyhow::Result<JobResult> {
    let notifier: Arc<dyn Notifier> = if config.job.dry_run {
        warn!("DRY_RUN enabled, no SMS will be sent");
        Arc::new(DryRunNotifier::new())
    } else {
        Arc::new(
            TwilioNotifier::from_config(&config.twilio)
                .context("failed to build Twilio client")?,
        )
    };

    let store = MySqlHabitStore::connect(&config.database)
        .await
        .context("failed to connect to MySQL")?;

    let runner = JobRunner::new(
        Arc::new(store.clone()),
        notifier,
        &config.twilio.from_number,
        &config.job.reminder_body,
    )
    .with_concurrency(config.job.concurrency);

    let result = runner.run(Utc::now()).await;
    store.close().await;
    let result = result.context("failed to list users")?;

    info!(
        summary = %serde_json::to_string(&result)?,
        exit_code = result.exit_code(),
        "job complete"
    );
    Ok(result)
}
