// The placeholder client application managed by the update runner.
// A single HTTP endpoint with a static greeting; its only job is to be a
// process the runner can download, start, and supersede.

use axum::routing::get;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;

/// Configuration for the client application.
#[derive(Debug, Clone, Parser)]
#[command(name = "client-app", about = "Placeholder client application")]
struct Settings {
    /// Address to listen on.
    #[arg(long, env = "CLIENT_APP_LISTEN", default_value = "127.0.0.1:8083")]
    listen: SocketAddr,
}

fn greeting() -> String {
    format!("Hello from client app version {}!", env!("CARGO_PKG_VERSION"))
}

fn router() -> Router {
    Router::new().route("/", get(|| async { greeting() }))
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
    tracing::info!("Client app {} starting on {}", env!("CARGO_PKG_VERSION"), settings.listen);

    let listener = match tokio::net::TcpListener::bind(settings.listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {}: {e}", settings.listen);
            return 1;
        }
    };

    match axum::serve(listener, router())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested.");
        })
        .await
    {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("Client app failed: {e}");
            1
        }
    }
}
