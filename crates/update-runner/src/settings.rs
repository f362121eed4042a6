// Runner configuration, parsed from CLI flags with env-var fallbacks.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Configuration for the update runner.
#[derive(Debug, Clone, Parser)]
#[command(name = "update-runner", about = "Keeps the client application current")]
pub struct Settings {
    /// URL of the update feed endpoint.
    #[arg(long, env = "UPDATE_FEED_URL", default_value = "http://127.0.0.1:8081/update")]
    pub feed_url: String,

    /// Directory holding downloaded artifacts and the version file.
    #[arg(long, env = "UPDATE_WORK_DIR", default_value = ".")]
    pub work_dir: PathBuf,

    /// Name of the persisted version file inside the work directory.
    #[arg(long, default_value = "version.txt")]
    pub version_file: String,

    /// Address the manual-trigger HTTP endpoint listens on.
    #[arg(long, env = "UPDATE_RUNNER_LISTEN", default_value = "127.0.0.1:8082")]
    pub listen: SocketAddr,

    /// Seconds between scheduled update checks.
    #[arg(long, env = "UPDATE_CHECK_INTERVAL", default_value_t = 60)]
    pub check_interval_secs: u64,

    /// Seconds to wait for the client to exit gracefully before killing it.
    #[arg(long, default_value_t = 5)]
    pub stop_grace_secs: u64,

    /// Command the artifact is launched with; the artifact path is appended.
    /// An empty string executes the artifact directly.
    #[arg(long, env = "UPDATE_LAUNCHER", default_value = "java -jar")]
    pub launcher: String,
}

impl Settings {
    /// Full path of the persisted version file.
    pub fn version_file_path(&self) -> PathBuf {
        self.work_dir.join(&self.version_file)
    }
}
