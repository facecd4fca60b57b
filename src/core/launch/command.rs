// ─── Launch Command ───
// Assembles the JVM argument vector for an installed release.

use std::path::PathBuf;

use tracing::debug;

use super::classpath::{build_classpath, classpath_entries, path_arg, ClientJarPosition};
use super::identity::{OfflineIdentity, OFFLINE_ACCESS_TOKEN, OFFLINE_USER_TYPE};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::layout::InstallLayout;
use crate::core::version::{Platform, ReleaseDescriptor};

pub const LAUNCHER_BRAND: &str = "CTLauncher";
pub const DEFAULT_MIN_MEMORY: &str = "512M";

pub struct LaunchCommandBuilder {
    layout: InstallLayout,
    platform: Platform,
    client_jar_position: ClientJarPosition,
    min_memory: String,
}

impl LaunchCommandBuilder {
    /// Relative install roots are made absolute so the arguments stay valid
    /// whatever the child's working directory.
    pub fn new(layout: &InstallLayout) -> LauncherResult<Self> {
        let root = std::path::absolute(layout.root())
            .map_err(|e| LauncherError::io(layout.root(), e))?;
        Ok(Self {
            layout: InstallLayout::new(root),
            platform: Platform::current(),
            client_jar_position: ClientJarPosition::default(),
            min_memory: DEFAULT_MIN_MEMORY.to_string(),
        })
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn client_jar_position(mut self, position: ClientJarPosition) -> Self {
        self.client_jar_position = position;
        self
    }

    pub fn min_memory(mut self, min_memory: impl Into<String>) -> Self {
        self.min_memory = min_memory.into();
        self
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    pub fn natives_dir(&self, release_id: &str) -> PathBuf {
        self.layout.natives_dir(release_id)
    }

    /// Arguments after the java executable, in launch order.
    pub fn build(
        &self,
        descriptor: &ReleaseDescriptor,
        identity: &OfflineIdentity,
        memory_gb: u32,
    ) -> LauncherResult<Vec<String>> {
        InstallLayout::check_release_id(&descriptor.id)?;
        let entries = classpath_entries(
            descriptor,
            &self.layout,
            &self.platform,
            self.client_jar_position,
        )?;
        let classpath = build_classpath(&entries);
        debug!("Classpath has {} entries", entries.len());

        let mut args = vec![
            format!("-Xmx{}G", memory_gb.max(1)),
            format!("-Xms{}", self.min_memory),
            format!(
                "-Djava.library.path={}",
                path_arg(&self.layout.natives_dir(&descriptor.id))
            ),
            format!("-Dminecraft.launcher.brand={}", LAUNCHER_BRAND),
            format!(
                "-Dminecraft.launcher.version={}",
                env!("CARGO_PKG_VERSION")
            ),
            "-cp".to_string(),
            classpath,
            descriptor.main_class().to_string(),
        ];

        let game_args: [(&str, String); 8] = [
            ("--username", identity.username.clone()),
            ("--uuid", identity.uuid_string()),
            ("--accessToken", OFFLINE_ACCESS_TOKEN.to_string()),
            ("--userType", OFFLINE_USER_TYPE.to_string()),
            ("--version", descriptor.id.clone()),
            ("--gameDir", path_arg(self.layout.root())),
            ("--assetsDir", path_arg(&self.layout.assets_dir())),
            ("--assetIndex", descriptor.asset_index_id().to_string()),
        ];
        for (flag, value) in game_args {
            args.push(flag.to_string());
            args.push(value);
        }

        if let Some(release_type) = descriptor.release_type.as_deref() {
            args.push("--versionType".to_string());
            args.push(release_type.to_string());
        }

        Ok(args)
    }
}

/// Render a command line for the log, quoting where a shell would need it.
pub fn format_command_for_logs(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(shell_escape)
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=')
    }) {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}
