// ─── Artifact Resolver ───
// Manifest lookup, descriptor fetch/persist, platform filtering and the
// ordered download plan for one release.

use std::path::PathBuf;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::core::downloader::{sha1_hex, ArtifactKind, DownloadEntry};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::layout::InstallLayout;
use crate::core::version::manifest::JSON_REQUEST_TIMEOUT;
use crate::core::version::{LibraryEntry, Platform, ReleaseDescriptor, VersionManifest};

/// Everything that has to be on disk before a release can start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    /// Client, then libraries (artifact before natives, manifest order),
    /// then the asset index.
    pub downloads: Vec<DownloadEntry>,
    /// Destinations among `downloads` that are native archives.
    pub native_archives: Vec<PathBuf>,
}

pub struct ArtifactResolver {
    client: Client,
    manifest_url: String,
    layout: InstallLayout,
}

impl ArtifactResolver {
    pub fn new(client: Client, manifest_url: impl Into<String>, layout: InstallLayout) -> Self {
        Self {
            client,
            manifest_url: manifest_url.into(),
            layout,
        }
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    pub async fn fetch_manifest(&self) -> LauncherResult<VersionManifest> {
        VersionManifest::fetch(&self.client, &self.manifest_url).await
    }

    /// Look `release_id` up in a freshly fetched manifest, fetch its
    /// descriptor and persist the raw text under `versions/<id>/<id>.json`.
    pub async fn resolve(&self, release_id: &str) -> LauncherResult<ReleaseDescriptor> {
        InstallLayout::check_release_id(release_id)?;
        let manifest = self.fetch_manifest().await?;
        let entry = manifest
            .find_version(release_id)
            .ok_or_else(|| LauncherError::VersionNotFound(release_id.to_string()))?;

        let raw = self.fetch_text(&entry.url).await?;
        if let Some(expected) = entry.sha1.as_deref() {
            let actual = sha1_hex(raw.as_bytes());
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(LauncherError::Sha1Mismatch {
                    url: entry.url.clone(),
                    path: self.layout.descriptor_path(release_id),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        let descriptor: ReleaseDescriptor =
            serde_json::from_str(&raw).map_err(|source| LauncherError::Parse {
                url: entry.url.clone(),
                source,
            })?;

        self.persist_descriptor(release_id, &raw).await?;
        info!(
            "Resolved {} ({} libraries)",
            release_id,
            descriptor.libraries.len()
        );
        Ok(descriptor)
    }

    /// A previously persisted descriptor, if one exists and still parses.
    pub async fn load_local(&self, release_id: &str) -> LauncherResult<Option<ReleaseDescriptor>> {
        InstallLayout::check_release_id(release_id)?;
        let path = self.layout.descriptor_path(release_id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LauncherError::io(path, e)),
        };

        match serde_json::from_str::<ReleaseDescriptor>(&raw) {
            Ok(descriptor) if descriptor.id == release_id => Ok(Some(descriptor)),
            Ok(descriptor) => {
                warn!(
                    "Descriptor at {:?} is for {}, not {}; ignoring",
                    path, descriptor.id, release_id
                );
                Ok(None)
            }
            Err(e) => {
                warn!("Corrupt descriptor at {:?}: {}", path, e);
                Ok(None)
            }
        }
    }

    async fn fetch_text(&self, url: &str) -> LauncherResult<String> {
        let response = self
            .client
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
        response
            .text()
            .await
            .map_err(|e| LauncherError::network(url, e))
    }

    async fn persist_descriptor(&self, release_id: &str, raw: &str) -> LauncherResult<()> {
        let dir = self.layout.version_dir(release_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| LauncherError::io(&dir, e))?;
        let path = self.layout.descriptor_path(release_id);
        tokio::fs::write(&path, raw)
            .await
            .map_err(|e| LauncherError::io(path, e))
    }
}

/// Libraries that apply to `platform`, in descriptor order.
pub fn select_libraries<'d>(
    descriptor: &'d ReleaseDescriptor,
    platform: &Platform,
) -> Vec<&'d LibraryEntry> {
    descriptor
        .libraries
        .iter()
        .filter(|lib| {
            let allowed = lib.is_allowed_on(platform);
            if !allowed {
                debug!("Skipping library (OS rule): {}", lib.name);
            }
            allowed
        })
        .collect()
}

/// Build the ordered download plan. Pure: nothing touches the disk.
pub fn plan_install(
    descriptor: &ReleaseDescriptor,
    layout: &InstallLayout,
    platform: &Platform,
) -> LauncherResult<InstallPlan> {
    InstallLayout::check_release_id(&descriptor.id)?;
    let mut plan = InstallPlan::default();

    let client = descriptor
        .client_download()
        .ok_or_else(|| LauncherError::MissingClientDownload(descriptor.id.clone()))?;
    plan.downloads.push(DownloadEntry {
        url: client.url.clone(),
        dest: layout.client_jar_path(&descriptor.id),
        sha1: client.sha1.clone(),
        size: client.size,
        kind: ArtifactKind::Client,
    });

    for lib in select_libraries(descriptor, platform) {
        let artifact = lib.artifact();
        let native = lib.native_artifact(platform);

        if artifact.is_none() && native.is_none() {
            warn!("Library {} has nothing to download for {}", lib.name, platform);
            continue;
        }

        if let Some(artifact) = artifact {
            plan.downloads.push(DownloadEntry {
                url: artifact.url.clone(),
                dest: layout.library_path(&artifact.path)?,
                sha1: artifact.sha1.clone(),
                size: artifact.size,
                kind: ArtifactKind::Library,
            });
        }

        if let Some(native) = native {
            let dest = layout.library_path(&native.path)?;
            plan.native_archives.push(dest.clone());
            plan.downloads.push(DownloadEntry {
                url: native.url.clone(),
                dest,
                sha1: native.sha1.clone(),
                size: native.size,
                kind: ArtifactKind::Native,
            });
        }
    }

    if let Some(index) = &descriptor.asset_index {
        plan.downloads.push(DownloadEntry {
            url: index.url.clone(),
            dest: layout.asset_index_path(&index.id)?,
            sha1: index.sha1.clone(),
            size: None,
            kind: ArtifactKind::AssetIndex,
        });
    }

    Ok(plan)
}
