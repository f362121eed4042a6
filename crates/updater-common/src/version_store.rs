// VersionStore: the durable record of the currently installed client version.
// Plain-text file, three lines in fixed order: version, artifact, url.
// Saved atomically (temp file + rename) so a crash mid-write can never leave
// a record that mixes old and new fields.

use crate::errors::UpdateError;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Version recorded before anything has ever been installed.
pub const BOOTSTRAP_VERSION: &str = "0.0.0";

/// Artifact file name used by the bootstrap record.
pub const DEFAULT_ARTIFACT: &str = "client_app.jar";

/// The durable description of the installed client version.
///
/// Exactly one record is current at any time; it is replaced wholesale after
/// a successful update, never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    /// Version identifier, compared by exact string equality.
    pub version: String,
    /// Artifact file name, relative to the runner's work directory.
    pub artifact: String,
    /// Origin download URL; empty for the bootstrap record.
    pub url: String,
}

impl VersionRecord {
    /// The default record written on first startup when no state exists yet.
    pub fn bootstrap() -> Self {
        Self {
            version: BOOTSTRAP_VERSION.to_string(),
            artifact: DEFAULT_ARTIFACT.to_string(),
            url: String::new(),
        }
    }
}

/// Persists and retrieves the [`VersionRecord`] across runner restarts.
pub struct VersionStore {
    path: PathBuf,
}

impl VersionStore {
    /// Create a store backed by the given file path. The file itself is only
    /// created on the first `load` or `save`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted record.
    ///
    /// If no file exists yet, the bootstrap record is persisted immediately
    /// and returned, establishing the file as the source of truth from then
    /// on. Any other I/O failure or a malformed file is a `Storage` error.
    pub fn load(&self) -> Result<VersionRecord, UpdateError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => self.parse(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let record = VersionRecord::bootstrap();
                self.save(&record)?;
                tracing::info!(
                    path = %self.path.display(),
                    "no persisted version found, wrote bootstrap record"
                );
                Ok(record)
            }
            Err(e) => Err(UpdateError::storage(&self.path, e)),
        }
    }

    /// Overwrite the persisted record atomically.
    ///
    /// The record is written to a temp file in the same directory, fsynced,
    /// and renamed over the target, so readers observe either the old record
    /// or the new one in full.
    pub fn save(&self, record: &VersionRecord) -> Result<(), UpdateError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|e| UpdateError::storage(&self.path, e))?;
        write!(tmp, "{}\n{}\n{}", record.version, record.artifact, record.url)
            .map_err(|e| UpdateError::storage(&self.path, e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| UpdateError::storage(&self.path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| UpdateError::storage(&self.path, e.error))?;
        Ok(())
    }

    fn parse(&self, text: &str) -> Result<VersionRecord, UpdateError> {
        let mut lines = text.lines();
        let version = lines.next().map(str::trim).unwrap_or_default();
        let artifact = lines.next().map(str::trim).unwrap_or_default();
        // The third line is absent for the bootstrap record.
        let url = lines.next().map(str::trim).unwrap_or_default();

        if version.is_empty() || artifact.is_empty() {
            return Err(UpdateError::storage(
                &self.path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "version file must contain a version and an artifact line",
                ),
            ));
        }

        Ok(VersionRecord {
            version: version.to_string(),
            artifact: artifact.to_string(),
            url: url.to_string(),
        })
    }
}
