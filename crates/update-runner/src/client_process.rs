// ClientProcess: the single owned handle to the running client application.
// Spawning pipes the child's stdout/stderr into the runner's log; shutdown
// sends SIGTERM and escalates to SIGKILL after a bounded grace period.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use updater_common::UpdateError;

/// Handle to the client application process. At most one exists at a time;
/// the supervisor terminates and drops the old handle before spawning a
/// successor.
pub struct ClientProcess {
    child: Child,
    pid: u32,
    artifact: PathBuf,
}

impl ClientProcess {
    /// Launch the client from `artifact`.
    ///
    /// `launcher` is the command prefix the artifact path is appended to
    /// (e.g. `"java -jar"`); when empty the artifact is executed directly.
    /// Fails with `ArtifactMissing` if the file is absent so a caller can
    /// distinguish "nothing downloaded yet" from a spawn failure.
    pub fn spawn(launcher: &str, artifact: &Path) -> Result<Self, UpdateError> {
        if !artifact.is_file() {
            return Err(UpdateError::ArtifactMissing {
                path: artifact.to_path_buf(),
            });
        }

        let mut parts = launcher.split_whitespace();
        let mut cmd = match parts.next() {
            Some(program) => {
                let mut cmd = Command::new(program);
                cmd.args(parts);
                cmd.arg(artifact);
                cmd
            }
            None => Command::new(artifact),
        };

        cmd.stdin(std::process::Stdio::null());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| UpdateError::ProcessStart {
            path: artifact.to_path_buf(),
            reason: e.to_string(),
        })?;
        let pid = child.id().unwrap_or(0);

        // Forward child output lines into the runner's log.
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, pid, "stdout"));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, pid, "stderr"));
        }

        tracing::info!(pid, artifact = %artifact.display(), "client process started");

        Ok(Self {
            child,
            pid,
            artifact: artifact.to_path_buf(),
        })
    }

    /// OS process id of the client.
    pub fn id(&self) -> u32 {
        self.pid
    }

    /// Artifact the client was launched from.
    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    /// Whether the process has not exited yet.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Stop the client: graceful signal first, forced kill once `grace` has
    /// elapsed without an exit. Consumes the handle; teardown failures are
    /// logged, not propagated.
    pub async fn shutdown(mut self, grace: Duration) {
        if !self.is_running() {
            tracing::info!(pid = self.pid, "client process already exited");
            return;
        }

        if self.terminate_gracefully(grace).await {
            tracing::info!(pid = self.pid, "client process exited after graceful signal");
            return;
        }

        tracing::warn!(
            pid = self.pid,
            grace_secs = grace.as_secs_f64(),
            "client process ignored termination signal, killing"
        );
        if let Err(e) = self.child.kill().await {
            tracing::warn!(pid = self.pid, error = %e, "failed to kill client process");
        }
        let _ = self.child.wait().await;
    }

    /// Send SIGTERM and wait up to `grace` for the process to exit.
    /// Returns `true` if it exited within the grace period.
    #[cfg(unix)]
    async fn terminate_gracefully(&mut self, grace: Duration) -> bool {
        // Signal the live id, never a stale one: once the child has exited
        // there is nothing to kill, and pid 0 would address our own group.
        let raw = match self.child.id() {
            Some(id) => id,
            None => return true,
        };

        let pid = nix::unistd::Pid::from_raw(raw as i32);
        if let Err(e) = nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGTERM) {
            tracing::warn!(pid = self.pid, error = %e, "failed to send SIGTERM");
            return false;
        }

        tokio::select! {
            result = self.child.wait() => result.is_ok(),
            _ = tokio::time::sleep(grace) => false,
        }
    }

    // No POSIX signals off unix; give the process the grace period to exit
    // on its own before the caller kills it.
    #[cfg(not(unix))]
    async fn terminate_gracefully(&mut self, grace: Duration) -> bool {
        tokio::select! {
            result = self.child.wait() => result.is_ok(),
            _ = tokio::time::sleep(grace) => false,
        }
    }
}

async fn forward_lines(
    stream: impl tokio::io::AsyncRead + Unpin,
    pid: u32,
    channel: &'static str,
) {
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::info!(target: "client", pid, channel, "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tempfile::TempDir;

    fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn spawn_missing_artifact_is_distinct_error() {
        let dir = TempDir::new().unwrap();
        let absent = dir.path().join("nope_client.jar");
        assert!(matches!(
            ClientProcess::spawn("sh", &absent),
            Err(UpdateError::ArtifactMissing { .. })
        ));
    }

    #[tokio::test]
    async fn spawn_with_bad_launcher_is_process_start_error() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "app.sh", "exit 0\n");
        assert!(matches!(
            ClientProcess::spawn("nonexistent_launcher_xyz_123", &script),
            Err(UpdateError::ProcessStart { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cooperative_client_stops_within_grace() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "app.sh", "sleep 30\n");

        let client = ClientProcess::spawn("sh", &script).unwrap();
        let started = Instant::now();
        client.shutdown(Duration::from_secs(5)).await;
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stubborn_client_is_killed_after_grace() {
        let dir = TempDir::new().unwrap();
        // Ignores SIGTERM; only SIGKILL can stop it.
        let script = write_script(&dir, "app.sh", "trap '' TERM\nwhile true; do sleep 1; done\n");

        let client = ClientProcess::spawn("sh", &script).unwrap();
        let pid = client.id();
        let started = Instant::now();
        client.shutdown(Duration::from_millis(300)).await;
        assert!(started.elapsed() < Duration::from_secs(5));

        // The process is gone.
        let alive = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), None).is_ok();
        assert!(!alive);
    }

    #[tokio::test]
    async fn shutdown_of_exited_client_returns_promptly() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "app.sh", "exit 0\n");

        let client = ClientProcess::spawn("sh", &script).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        // Nothing left to signal; must not wait out the grace period.
        let started = Instant::now();
        client.shutdown(Duration::from_secs(5)).await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn is_running_reflects_exit() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "app.sh", "exit 0\n");

        let mut client = ClientProcess::spawn("sh", &script).unwrap();
        // Wait for the short-lived script to finish.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!client.is_running());
    }
}
