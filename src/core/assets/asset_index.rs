use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::core::downloader::{
    ArtifactKind, DownloadEntry, Downloader, FetchOutcome, FetchSummary, InstallObserver,
    NoopObserver,
};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::layout::InstallLayout;

/// Top-level asset index JSON structure.
#[derive(Debug, Deserialize)]
pub struct AssetIndex {
    pub objects: HashMap<String, AssetObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    #[serde(default)]
    pub size: Option<u64>,
}

pub const DEFAULT_RESOURCES_URL: &str = "https://resources.download.minecraft.net";

const STATUS_EVERY: usize = 50;

impl AssetIndex {
    /// Read an index that the install plan already placed on disk.
    pub async fn load(path: &Path) -> LauncherResult<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LauncherError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|source| LauncherError::Parse {
            url: path.display().to_string(),
            source,
        })
    }

    /// One download per distinct hash, ordered by hash.
    pub fn object_downloads(
        &self,
        layout: &InstallLayout,
        resources_url: &str,
    ) -> LauncherResult<Vec<DownloadEntry>> {
        let unique: BTreeMap<&str, &AssetObject> = self
            .objects
            .values()
            .map(|obj| (obj.hash.as_str(), obj))
            .collect();

        let base = resources_url.trim_end_matches('/');
        unique
            .into_values()
            .map(|obj| {
                let dest = layout.asset_object_path(&obj.hash)?;
                Ok(DownloadEntry {
                    url: format!("{}/{}/{}", base, &obj.hash[..2], obj.hash),
                    dest,
                    sha1: Some(obj.hash.clone()),
                    size: obj.size,
                    kind: ArtifactKind::AssetObject,
                })
            })
            .collect()
    }
}

/// Download every object referenced by the index `index_id`.
///
/// Sequential like the rest of the install; status is reported every
/// [`STATUS_EVERY`] objects and progress tracks the whole batch.
pub async fn download_asset_objects(
    downloader: &Downloader,
    layout: &InstallLayout,
    index_id: &str,
    resources_url: &str,
    observer: &dyn InstallObserver,
) -> LauncherResult<FetchSummary> {
    let index = AssetIndex::load(&layout.asset_index_path(index_id)?).await?;
    let entries = index.object_downloads(layout, resources_url)?;
    let total = entries.len();
    info!("Asset index {} references {} objects", index_id, total);

    let mut summary = FetchSummary::default();
    for (done, entry) in entries.iter().enumerate() {
        if done % STATUS_EVERY == 0 {
            observer.on_status(&format!("Downloading assets ({}/{})", done, total));
            observer.on_progress(done as f32 / total as f32);
        }
        match downloader
            .fetch(&entry.url, &entry.dest, entry.sha1.as_deref(), &NoopObserver)
            .await?
        {
            FetchOutcome::Cached => summary.cached += 1,
            FetchOutcome::Downloaded { bytes } => {
                summary.downloaded += 1;
                summary.bytes += bytes;
            }
        }
    }
    observer.on_progress(1.0);

    info!(
        "Assets: {} downloaded, {} already present",
        summary.downloaded, summary.cached
    );
    Ok(summary)
}
