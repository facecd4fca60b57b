use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::LauncherResult;
use crate::core::layout::InstallLayout;
use crate::core::resolver::select_libraries;
use crate::core::version::{Platform, ReleaseDescriptor};

/// Where the client archive goes relative to the libraries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientJarPosition {
    First,
    #[default]
    Last,
}

pub fn classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}

/// Classpath entries: every selected library artifact present on disk, in
/// descriptor order, plus the client jar at `position`. The client jar is
/// always included, even before it has been downloaded.
pub fn classpath_entries(
    descriptor: &ReleaseDescriptor,
    layout: &InstallLayout,
    platform: &Platform,
    position: ClientJarPosition,
) -> LauncherResult<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for lib in select_libraries(descriptor, platform) {
        let Some(artifact) = lib.artifact() else {
            continue;
        };
        let path = layout.library_path(&artifact.path)?;
        if path.is_file() {
            entries.push(path);
        } else {
            debug!("Not on classpath (missing): {:?}", path);
        }
    }

    let client = layout.client_jar_path(&descriptor.id);
    match position {
        ClientJarPosition::First => entries.insert(0, client),
        ClientJarPosition::Last => entries.push(client),
    }

    dedup_preserving_order(&mut entries);
    Ok(entries)
}

/// Join entries with the platform separator.
pub fn build_classpath(entries: &[PathBuf]) -> String {
    entries
        .iter()
        .map(|entry| path_arg(entry))
        .collect::<Vec<_>>()
        .join(classpath_separator())
}

/// Render a path for the JVM command line.
pub fn path_arg(path: &Path) -> String {
    let text = path.to_string_lossy().to_string();

    #[cfg(target_os = "windows")]
    {
        // The JVM rejects extended-length `\\?\` paths on the classpath.
        if let Some(stripped) = text.strip_prefix(r"\\?\") {
            return stripped.to_string();
        }
    }

    text
}

fn dedup_preserving_order(entries: &mut Vec<PathBuf>) {
    let mut seen = HashSet::new();
    entries.retain(|entry| {
        let key = if cfg!(target_os = "windows") {
            entry.to_string_lossy().to_lowercase()
        } else {
            entry.to_string_lossy().to_string()
        };
        seen.insert(key)
    });
}
