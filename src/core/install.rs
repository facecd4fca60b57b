use std::path::PathBuf;

use reqwest::Client;
use tracing::info;

use crate::core::assets::{self, DEFAULT_RESOURCES_URL};
use crate::core::downloader::{Downloader, FetchSummary, InstallObserver};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::layout::InstallLayout;
use crate::core::natives;
use crate::core::resolver::{plan_install, ArtifactResolver, InstallPlan};
use crate::core::version::{Platform, ReleaseDescriptor};

/// Result of a successful install: everything the launch step needs.
#[derive(Debug, Clone)]
pub struct InstalledRelease {
    pub descriptor: ReleaseDescriptor,
    pub plan: InstallPlan,
    pub natives_dir: PathBuf,
    pub summary: FetchSummary,
}

/// Resolve → plan → fetch → extract, for one release.
pub struct Installer {
    resolver: ArtifactResolver,
    downloader: Downloader,
    platform: Platform,
    asset_objects: bool,
    resources_url: String,
}

impl Installer {
    pub fn new(client: Client, manifest_url: impl Into<String>, layout: InstallLayout) -> Self {
        Self {
            resolver: ArtifactResolver::new(client.clone(), manifest_url, layout),
            downloader: Downloader::new(client),
            platform: Platform::current(),
            asset_objects: false,
            resources_url: DEFAULT_RESOURCES_URL.to_string(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Also fetch the objects referenced by the asset index.
    pub fn with_asset_objects(mut self, enabled: bool, resources_url: impl Into<String>) -> Self {
        self.asset_objects = enabled;
        self.resources_url = resources_url.into();
        self
    }

    pub fn resolver(&self) -> &ArtifactResolver {
        &self.resolver
    }

    pub fn layout(&self) -> &InstallLayout {
        self.resolver.layout()
    }

    /// Install `release_id`. A descriptor already on disk is reused
    /// without contacting the manifest; every planned file is still
    /// checked, so an interrupted install resumes where it stopped.
    pub async fn install(
        &self,
        release_id: &str,
        observer: &dyn InstallObserver,
    ) -> LauncherResult<InstalledRelease> {
        InstallLayout::check_release_id(release_id)?;
        info!("Installing {} for {}", release_id, self.platform);

        observer.on_status(&format!("Resolving {}...", release_id));
        let descriptor = match self.resolver.load_local(release_id).await? {
            Some(descriptor) => {
                info!("Using local descriptor for {}", release_id);
                descriptor
            }
            None => self.resolver.resolve(release_id).await?,
        };

        let layout = self.layout();
        let plan = plan_install(&descriptor, layout, &self.platform)?;
        let mut summary = self.downloader.fetch_all(&plan.downloads, observer).await?;

        let natives_dir = layout.natives_dir(release_id);
        if !plan.native_archives.is_empty() {
            observer.on_status("Extracting natives...");
            if tokio::fs::try_exists(&natives_dir).await.unwrap_or(false) {
                tokio::fs::remove_dir_all(&natives_dir)
                    .await
                    .map_err(|e| LauncherError::io(&natives_dir, e))?;
            }
            natives::extract_all(&plan.native_archives, &natives_dir).await?;
        }

        if self.asset_objects && descriptor.asset_index.is_some() {
            let assets = assets::download_asset_objects(
                &self.downloader,
                layout,
                descriptor.asset_index_id(),
                &self.resources_url,
                observer,
            )
            .await?;
            summary.downloaded += assets.downloaded;
            summary.cached += assets.cached;
            summary.bytes += assets.bytes;
        }

        observer.on_status(&format!("{} ready", release_id));
        info!("{} installed", release_id);

        Ok(InstalledRelease {
            descriptor,
            plan,
            natives_dir,
            summary,
        })
    }
}
