use super::{build_task, load_config};
use crate::output::Output;
use color_eyre::Result;
use purge_config::PathManager;
use purge_core::{ScheduleOptions, Scheduler};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub async fn run_daemon(
    path_manager: &PathManager,
    interval_override: Option<u64>,
    no_startup_run: bool,
    dry_run: bool,
    output: &Output,
) -> Result<()> {
    let mut config = load_config(path_manager)?;
    if let Some(interval) = interval_override {
        config.scheduler.check_interval_seconds = interval;
        config
            .validate()
            .map_err(|e| color_eyre::eyre::eyre!("Configuration validation failed: {}", e))?;
    }

    let task = build_task(path_manager, &config, dry_run)?;
    let options = ScheduleOptions {
        interval: Duration::from_secs(config.scheduler.check_interval_seconds),
        run_on_startup: config.scheduler.run_on_startup && !no_startup_run,
    };

    info!(
        operation = "daemon_start",
        categories = ?config.categories,
        stall_threshold_secs = config.thresholds.stall_seconds,
        eta_threshold_secs = config.thresholds.eta_seconds,
        interval_secs = config.scheduler.check_interval_seconds,
        dry_run,
        "Starting daemon"
    );

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal(signal_token.clone()).await {
            error!(
                operation = "signal_handler_error",
                error = %e,
                "Signal handler failed, stopping"
            );
            signal_token.cancel();
        }
    });

    let scheduler = Scheduler::new(task, options);
    let summary = scheduler.run(token).await;

    info!(operation = "daemon_stopped", runs = summary.runs, "Daemon stopped");
    output.daemon_stopped(&summary);

    Ok(())
}

/// Wait for SIGINT or SIGTERM, then cancel `token` so the scheduler stops
/// after any run in progress.
async fn wait_for_shutdown_signal(token: CancellationToken) -> std::io::Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

        tokio::select! {
            result = ctrl_c => {
                result?;
                info!(operation = "signal_received", signal = "SIGINT");
            }
            _ = sigterm.recv() => {
                info!(operation = "signal_received", signal = "SIGTERM");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await?;
        info!(operation = "signal_received", signal = "SIGINT");
    }

    token.cancel();
    Ok(())
}
