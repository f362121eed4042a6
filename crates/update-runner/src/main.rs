// Entry point for the update runner.
//
// Wires the supervisor to its HTTP collaborators, starts the client recorded
// in the version store, then serves the manual trigger endpoint while a
// periodic scheduler re-checks the feed until ctrl-c.

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use update_runner::feed::{HttpArtifactFetcher, HttpVersionFeed};
use update_runner::supervisor::SupervisorOptions;
use update_runner::{trigger, Settings, UpdateSupervisor};

fn main() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime");

    let exit_code = runtime.block_on(run());
    std::process::exit(exit_code);
}

async fn run() -> i32 {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let settings = Settings::parse();
    tracing::info!("Update runner starting.");
    tracing::info!("  Version  = {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("  Feed     = {}", settings.feed_url);
    tracing::info!("  Work dir = {}", settings.work_dir.display());
    tracing::info!("  Listen   = {}", settings.listen);

    let supervisor = match build_supervisor(&settings) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to initialize update runner: {e:?}");
            return 1;
        }
    };

    // Startup failures are not fatal: with no artifact and an unreachable
    // feed the runner keeps polling until a feed becomes reachable.
    if let Err(e) = supervisor.start().await {
        tracing::warn!(error = %e, "could not start a client at startup, will retry on schedule");
    }

    let cancel = CancellationToken::new();
    let scheduler = tokio::spawn(schedule_checks(
        Arc::clone(&supervisor),
        Duration::from_secs(settings.check_interval_secs),
        cancel.clone(),
    ));

    let listener = match tokio::net::TcpListener::bind(settings.listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind trigger endpoint on {}: {e}", settings.listen);
            cancel.cancel();
            return 1;
        }
    };

    let shutdown_cancel = cancel.clone();
    let serve_result = axum::serve(listener, trigger::router(Arc::clone(&supervisor)))
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested.");
            shutdown_cancel.cancel();
        })
        .await;

    cancel.cancel();
    let _ = scheduler.await;
    supervisor.shutdown().await;

    match serve_result {
        Ok(()) => {
            tracing::info!("Update runner exiting.");
            0
        }
        Err(e) => {
            tracing::error!("Trigger endpoint failed: {e}");
            1
        }
    }
}

fn build_supervisor(settings: &Settings) -> anyhow::Result<UpdateSupervisor> {
    std::fs::create_dir_all(&settings.work_dir)?;

    let feed = Arc::new(HttpVersionFeed::new(settings.feed_url.clone())?);
    let fetcher = Arc::new(HttpArtifactFetcher::new()?);
    let store = updater_common::VersionStore::new(settings.version_file_path());

    let supervisor = UpdateSupervisor::new(
        store,
        feed,
        fetcher,
        SupervisorOptions {
            work_dir: settings.work_dir.clone(),
            launcher: settings.launcher.clone(),
            stop_grace: Duration::from_secs(settings.stop_grace_secs),
        },
    )?;
    Ok(supervisor)
}

/// Periodic trigger: one update check per interval until cancelled.
async fn schedule_checks(
    supervisor: Arc<UpdateSupervisor>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; startup already did that work.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = supervisor.check_for_updates().await {
                    tracing::warn!(error = %e, "scheduled update check failed");
                }
            }
            _ = cancel.cancelled() => break,
        }
    }
}
