// Entry point for the update server: the version feed.
//
// Serves GET /update with the latest client release descriptor as JSON.
// The advertised version and download URL come from CLI flags / env vars;
// publishing a new client version means restarting with new values.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use std::net::SocketAddr;
use updater_common::ReleaseInfo;

/// Configuration for the update server.
#[derive(Debug, Clone, Parser)]
#[command(name = "update-server", about = "Serves the latest client version descriptor")]
struct Settings {
    /// Address to listen on.
    #[arg(long, env = "UPDATE_SERVER_LISTEN", default_value = "127.0.0.1:8081")]
    listen: SocketAddr,

    /// Version the feed advertises as latest.
    #[arg(long, env = "UPDATE_LATEST_VERSION", default_value = "1.0.0")]
    latest_version: String,

    /// Download URL for the advertised artifact.
    #[arg(
        long,
        env = "UPDATE_ARTIFACT_URL",
        default_value = "http://example-host.com/self-updating-service-client-1.0.0.jar"
    )]
    artifact_url: String,
}

fn router(release: ReleaseInfo) -> Router {
    Router::new()
        .route("/update", get(get_update_info))
        .with_state(release)
}

async fn get_update_info(State(release): State<ReleaseInfo>) -> Json<ReleaseInfo> {
    tracing::debug!(version = %release.version, "serving release descriptor");
    Json(release)
}

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
    let release = ReleaseInfo {
        version: settings.latest_version.clone(),
        url: settings.artifact_url.clone(),
    };
    tracing::info!("Update server starting.");
    tracing::info!("  Listen  = {}", settings.listen);
    tracing::info!("  Latest  = {}", release.version);
    tracing::info!("  URL     = {}", release.url);

    let listener = match tokio::net::TcpListener::bind(settings.listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {}: {e}", settings.listen);
            return 1;
        }
    };

    match axum::serve(listener, router(release))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested.");
        })
        .await
    {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("Update server failed: {e}");
            1
        }
    }
}
