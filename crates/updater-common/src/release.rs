// The release descriptor exchanged between the update feed and the runner,
// and the deterministic artifact-name derivation.

use serde::{Deserialize, Serialize};

/// Fixed suffix appended to every derived artifact file name.
pub const ARTIFACT_SUFFIX: &str = "client.jar";

/// The latest-version descriptor served by the update feed.
///
/// Wire format is JSON: `{"version": "<string>", "url": "<string>"}`.
/// Either field may be absent or empty; the runner validates before acting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub url: String,
}

/// Derive the local artifact file name for a version string.
///
/// Every non-alphanumeric character is replaced with an underscore and the
/// fixed suffix is appended, so `"1.1.0"` yields `1_1_0_client.jar`. The
/// mapping is pure; repeated checks for the same version always resolve to
/// the same file.
pub fn artifact_file_name(version: &str) -> String {
    let sanitized: String = version
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{sanitized}_{ARTIFACT_SUFFIX}")
}
