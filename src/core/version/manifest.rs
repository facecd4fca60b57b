// ─── Version Manifest ───
// Index of every published version and where its descriptor lives.

use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::core::error::{LauncherError, LauncherResult};

/// Total timeout for manifest/descriptor requests.
pub const JSON_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Top-level version manifest (`version_manifest_v2.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    #[serde(default)]
    pub latest: Option<LatestVersions>,
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatestVersions {
    pub release: String,
    pub snapshot: String,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: VersionType,
    /// Where the release descriptor is fetched from.
    pub url: String,
    /// SHA-1 of the descriptor body (v2 manifests only).
    #[serde(default)]
    pub sha1: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VersionType {
    Release,
    Snapshot,
    #[serde(other)]
    Other,
}

impl VersionManifest {
    /// Fetch the manifest from `url`.
    pub async fn fetch(client: &reqwest::Client, url: &str) -> LauncherResult<Self> {
        info!("Fetching version manifest from {}", url);

        let response = client
            .get(url)
            .timeout(JSON_REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| LauncherError::network(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let raw = response
            .text()
            .await
            .map_err(|e| LauncherError::network(url, e))?;
        let manifest: VersionManifest =
            serde_json::from_str(&raw).map_err(|source| LauncherError::Parse {
                url: url.to_string(),
                source,
            })?;

        info!("Loaded {} versions from manifest", manifest.versions.len());
        Ok(manifest)
    }

    /// Exact id lookup; no "latest" aliasing.
    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Stable releases, in manifest order.
    pub fn releases(&self) -> Vec<&VersionEntry> {
        self.of_type(VersionType::Release)
    }

    pub fn snapshots(&self) -> Vec<&VersionEntry> {
        self.of_type(VersionType::Snapshot)
    }

    /// Releases and snapshots interleaved in manifest order; old alpha and
    /// beta entries are left out.
    pub fn releases_and_snapshots(&self) -> Vec<&VersionEntry> {
        self.versions
            .iter()
            .filter(|v| matches!(v.version_type, VersionType::Release | VersionType::Snapshot))
            .collect()
    }

    fn of_type(&self, version_type: VersionType) -> Vec<&VersionEntry> {
        self.versions
            .iter()
            .filter(|v| v.version_type == version_type)
            .collect()
    }
}
