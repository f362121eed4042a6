// UpdateSupervisor: drives the check-download-replace-persist cycle and owns
// the single client process handle.
//
// A cycle is all-or-nothing with respect to durable state: any error aborts
// it, and the version store is only written after the replacement process is
// confirmed started. The store must never name a version whose process
// failed to start.

use crate::client_process::ClientProcess;
use crate::feed::{ArtifactFetcher, VersionFeed};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use updater_common::{artifact_file_name, UpdateError, VersionRecord, VersionStore};

/// Supervisor options not covered by the injected collaborators.
#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    /// Directory artifacts are downloaded into.
    pub work_dir: PathBuf,
    /// Command prefix used to launch artifacts; empty executes them directly.
    pub launcher: String,
    /// Grace period between the termination signal and a forced kill.
    pub stop_grace: Duration,
}

/// Mutable state guarded by the cycle lock: the current record and the one
/// live client handle.
struct SupervisorState {
    current: VersionRecord,
    client: Option<ClientProcess>,
}

/// Orchestrates update checks and client process supersession.
pub struct UpdateSupervisor {
    store: VersionStore,
    feed: Arc<dyn VersionFeed>,
    fetcher: Arc<dyn ArtifactFetcher>,
    options: SupervisorOptions,
    state: Mutex<SupervisorState>,
}

impl UpdateSupervisor {
    /// Build a supervisor, loading (or bootstrapping) the persisted record.
    pub fn new(
        store: VersionStore,
        feed: Arc<dyn VersionFeed>,
        fetcher: Arc<dyn ArtifactFetcher>,
        options: SupervisorOptions,
    ) -> Result<Self, UpdateError> {
        let current = store.load()?;
        tracing::info!(
            version = %current.version,
            artifact = %current.artifact,
            "loaded persisted version record"
        );
        Ok(Self {
            store,
            feed,
            fetcher,
            options,
            state: Mutex::new(SupervisorState {
                current,
                client: None,
            }),
        })
    }

    /// Startup: launch the client recorded in the store. If its artifact was
    /// never downloaded (first run), fall through to an immediate update
    /// check instead of failing.
    pub async fn start(&self) -> Result<(), UpdateError> {
        let mut state = self.state.lock().await;
        let artifact = self.options.work_dir.join(&state.current.artifact);

        match ClientProcess::spawn(&self.options.launcher, &artifact) {
            Ok(client) => {
                state.client = Some(client);
                Ok(())
            }
            Err(UpdateError::ArtifactMissing { path }) => {
                drop(state);
                tracing::info!(
                    artifact = %path.display(),
                    "no local artifact yet, asking the feed"
                );
                self.check_for_updates().await.map(|_| ())
            }
            Err(e) => Err(e),
        }
    }

    /// Run one update cycle.
    ///
    /// Returns `Ok(true)` when a new version was installed, `Ok(false)` when
    /// already current or when another cycle holds the lock (overlapping
    /// triggers skip rather than queue).
    pub async fn check_for_updates(&self) -> Result<bool, UpdateError> {
        let mut state = match self.state.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::debug!("update cycle already in flight, skipping");
                return Ok(false);
            }
        };

        let latest = self.feed.latest().await?;

        if latest.version == state.current.version {
            tracing::debug!(version = %latest.version, "client already current");
            return Ok(false);
        }

        if latest.url.trim().is_empty() {
            return Err(UpdateError::Configuration(format!(
                "feed offered version {} without a download url",
                latest.version
            )));
        }

        let artifact = artifact_file_name(&latest.version);
        let dest = self.options.work_dir.join(&artifact);
        tracing::info!(
            from = %state.current.version,
            to = %latest.version,
            url = %latest.url,
            "downloading update"
        );
        self.fetcher.fetch(&latest.url, &dest).await?;

        // Supersede: stop the old client before its replacement starts, so
        // at most one is ever alive.
        if let Some(old) = state.client.take() {
            tracing::info!(pid = old.id(), "stopping current client");
            old.shutdown(self.options.stop_grace).await;
        }

        let client = ClientProcess::spawn(&self.options.launcher, &dest)?;
        state.client = Some(client);

        // Persist only now that the new process is confirmed started; a
        // failed spawn above leaves the old record authoritative so the
        // next cycle retries the same version.
        let record = VersionRecord {
            version: latest.version,
            artifact,
            url: latest.url,
        };
        self.store.save(&record)?;
        state.current = record;

        tracing::info!(version = %state.current.version, "update complete");
        Ok(true)
    }

    /// The record currently considered installed.
    pub async fn current_record(&self) -> VersionRecord {
        self.state.lock().await.current.clone()
    }

    /// Pid of the running client, if one is alive.
    pub async fn client_pid(&self) -> Option<u32> {
        let mut state = self.state.lock().await;
        state
            .client
            .as_mut()
            .and_then(|client| client.is_running().then(|| client.id()))
    }

    /// Stop the owned client, if any. Used when the runner itself exits.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if let Some(client) = state.client.take() {
            tracing::info!(pid = client.id(), "shutting down client");
            client.shutdown(self.options.stop_grace).await;
        }
    }
}
