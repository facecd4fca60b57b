// ─── Release Descriptor ───
// Per-release JSON: client download, libraries (with OS rules), asset index.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use super::rules::{evaluate_rules, Platform, Rule};

/// Entry point used when a descriptor does not name one.
pub const FALLBACK_MAIN_CLASS: &str = "net.minecraft.client.main.Main";

/// A parsed release descriptor. The raw text is persisted separately.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDescriptor {
    pub id: String,
    #[serde(default)]
    pub main_class: Option<String>,
    #[serde(default, rename = "type")]
    pub release_type: Option<String>,
    #[serde(default)]
    pub asset_index: Option<AssetIndexInfo>,
    #[serde(default)]
    pub downloads: Option<ReleaseDownloads>,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseDownloads {
    #[serde(default)]
    pub client: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadArtifact {
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexInfo {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub total_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryEntry {
    pub name: String,
    #[serde(default)]
    pub rules: Option<Vec<Rule>>,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    /// OS name → classifier key, possibly containing `${arch}`.
    #[serde(default)]
    pub natives: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<LibraryArtifact>,
    #[serde(default)]
    pub classifiers: HashMap<String, LibraryArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryArtifact {
    /// Path relative to the libraries directory.
    pub path: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl ReleaseDescriptor {
    pub fn main_class(&self) -> &str {
        self.main_class
            .as_deref()
            .filter(|main| !main.trim().is_empty())
            .unwrap_or(FALLBACK_MAIN_CLASS)
    }

    pub fn client_download(&self) -> Option<&DownloadArtifact> {
        self.downloads.as_ref()?.client.as_ref()
    }

    /// Asset index id, falling back to the release id for old descriptors.
    pub fn asset_index_id(&self) -> &str {
        self.asset_index
            .as_ref()
            .map_or(self.id.as_str(), |index| index.id.as_str())
    }
}

impl LibraryEntry {
    /// Libraries without rules are always included; otherwise the rule list
    /// decides (last match wins, no match denies).
    pub fn is_allowed_on(&self, platform: &Platform) -> bool {
        match self.rules.as_deref() {
            None | Some([]) => true,
            Some(rules) => evaluate_rules(rules, platform),
        }
    }

    pub fn artifact(&self) -> Option<&LibraryArtifact> {
        self.downloads.as_ref()?.artifact.as_ref()
    }

    /// Classifier key for this platform, with `${arch}` substituted.
    pub fn native_classifier(&self, platform: &Platform) -> Option<String> {
        let key = self.natives.as_ref()?.get(platform.os.as_str())?;
        Some(key.replace("${arch}", platform.arch.bits()))
    }

    /// The native archive for this platform, if the descriptor ships one.
    /// A classifier key without a matching download is skipped, not an error.
    pub fn native_artifact(&self, platform: &Platform) -> Option<&LibraryArtifact> {
        let classifier = self.native_classifier(platform)?;
        let found = self.downloads.as_ref()?.classifiers.get(&classifier);
        if found.is_none() {
            debug!(
                "No '{}' classifier download for {} (skipping natives)",
                classifier, self.name
            );
        }
        found
    }
}
