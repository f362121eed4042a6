// updater-common: Shared types and infrastructure for the self-updating service.
// Leaf crate; the update-runner and update-server binaries both depend on it.

pub mod errors;
pub mod http_client_factory;
pub mod release;
pub mod version_store;

// ---------------------------------------------------------------------------
// Re-exports for convenient access
// ---------------------------------------------------------------------------

pub use errors::UpdateError;
pub use http_client_factory::HttpClientFactory;
pub use release::{artifact_file_name, ReleaseInfo, ARTIFACT_SUFFIX};
pub use version_store::{VersionRecord, VersionStore, BOOTSTRAP_VERSION, DEFAULT_ARTIFACT};
