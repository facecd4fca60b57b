use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::assets::DEFAULT_RESOURCES_URL;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::launch::ClientJarPosition;
use crate::core::layout::InstallLayout;

pub const DEFAULT_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";

const SETTINGS_FILE: &str = "launcher_settings.json";

pub const MIN_MEMORY_GB: u32 = 1;
pub const MAX_MEMORY_GB: u32 = 64;

/// Persisted launcher configuration. Unknown or missing fields fall back
/// to their defaults, so older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    pub install_root: PathBuf,
    pub manifest_url: String,
    pub resources_url: String,
    pub java_path: Option<PathBuf>,
    pub memory_gb: u32,
    pub min_memory: String,
    pub client_jar_position: ClientJarPosition,
    pub download_asset_objects: bool,
    pub http_timeout_secs: u64,
    pub last_username: Option<String>,
    pub last_version: Option<String>,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            install_root: default_install_root(),
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            resources_url: DEFAULT_RESOURCES_URL.to_string(),
            java_path: None,
            memory_gb: 4,
            min_memory: "512M".to_string(),
            client_jar_position: ClientJarPosition::Last,
            download_asset_objects: false,
            http_timeout_secs: 30,
            last_username: None,
            last_version: None,
        }
    }
}

impl LauncherSettings {
    /// Settings stored under `install_root`. A missing or unreadable file
    /// yields defaults rooted there.
    pub fn load(install_root: &Path) -> Self {
        let path = settings_path(install_root);
        let mut settings = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<LauncherSettings>(&raw).unwrap_or_else(|e| {
                warn!("Ignoring corrupt settings at {:?}: {}", path, e);
                LauncherSettings::default()
            }),
            Err(_) => LauncherSettings::default(),
        };
        settings.install_root = install_root.to_path_buf();
        settings
    }

    pub fn save(&self) -> LauncherResult<()> {
        std::fs::create_dir_all(&self.install_root)
            .map_err(|e| LauncherError::io(&self.install_root, e))?;
        let path = settings_path(&self.install_root);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|e| LauncherError::io(path, e))
    }

    pub fn layout(&self) -> InstallLayout {
        InstallLayout::new(&self.install_root)
    }

    pub fn memory_gb(&self) -> u32 {
        self.memory_gb.clamp(MIN_MEMORY_GB, MAX_MEMORY_GB)
    }
}

pub fn settings_path(install_root: &Path) -> PathBuf {
    install_root.join(SETTINGS_FILE)
}

/// Platform-conventional game directory.
pub fn default_install_root() -> PathBuf {
    if cfg!(target_os = "macos") {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("minecraft")
    } else if cfg!(target_os = "windows") {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minecraft")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minecraft")
    }
}
