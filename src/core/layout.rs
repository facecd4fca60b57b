use std::path::{Component, Path, PathBuf};

use crate::core::error::{LauncherError, LauncherResult};

/// On-disk layout of an install root (the `.minecraft` equivalent).
///
/// ```text
/// <root>/
///   versions/<id>/<id>.json     raw release descriptor
///   versions/<id>/<id>.jar      client archive
///   versions/<id>/natives/      extracted native libraries
///   libraries/<group path>/...  library archives
///   assets/indexes/<id>.json    asset index
///   assets/objects/<xx>/<hash>  asset objects (opt-in)
/// ```
///
/// Nothing is created up front; directories appear on first write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    /// Release ids name a directory under `versions/`: one plain segment.
    pub fn check_release_id(id: &str) -> LauncherResult<()> {
        if id.contains(['/', '\\']) || checked_relative(id)?.components().count() != 1 {
            return Err(LauncherError::UnsafePath(id.to_string()));
        }
        Ok(())
    }

    pub fn version_dir(&self, id: &str) -> PathBuf {
        self.versions_dir().join(id)
    }

    pub fn descriptor_path(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{id}.json"))
    }

    pub fn client_jar_path(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{id}.jar"))
    }

    pub fn natives_dir(&self, id: &str) -> PathBuf {
        self.version_dir(id).join("natives")
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.root.join("libraries")
    }

    /// Resolve a descriptor-supplied relative path under `libraries/`.
    pub fn library_path(&self, relative: &str) -> LauncherResult<PathBuf> {
        Ok(self.libraries_dir().join(checked_relative(relative)?))
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    pub fn asset_index_path(&self, index_id: &str) -> LauncherResult<PathBuf> {
        let file = checked_relative(&format!("{index_id}.json"))?;
        Ok(self.assets_dir().join("indexes").join(file))
    }

    pub fn asset_object_path(&self, hash: &str) -> LauncherResult<PathBuf> {
        if hash.len() < 2 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(LauncherError::UnsafePath(hash.to_string()));
        }
        Ok(self.assets_dir().join("objects").join(&hash[..2]).join(hash))
    }
}

/// Paths in remote JSON are untrusted: only plain relative components.
fn checked_relative(raw: &str) -> LauncherResult<PathBuf> {
    let path = Path::new(raw);
    let is_plain = !raw.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if !is_plain {
        return Err(LauncherError::UnsafePath(raw.to_string()));
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_files_live_under_their_id() {
        let layout = InstallLayout::new("/games/mc");
        assert_eq!(
            layout.descriptor_path("1.20.4"),
            PathBuf::from("/games/mc/versions/1.20.4/1.20.4.json")
        );
        assert_eq!(
            layout.client_jar_path("1.20.4"),
            PathBuf::from("/games/mc/versions/1.20.4/1.20.4.jar")
        );
        assert_eq!(
            layout.natives_dir("1.20.4"),
            PathBuf::from("/games/mc/versions/1.20.4/natives")
        );
    }

    #[test]
    fn library_paths_follow_the_maven_layout() {
        let layout = InstallLayout::new("/games/mc");
        let path = layout
            .library_path("org/lwjgl/lwjgl/3.3.3/lwjgl-3.3.3.jar")
            .unwrap();
        assert_eq!(
            path,
            PathBuf::from("/games/mc/libraries/org/lwjgl/lwjgl/3.3.3/lwjgl-3.3.3.jar")
        );
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let layout = InstallLayout::new("/games/mc");
        assert!(layout.library_path("../../etc/passwd").is_err());
        assert!(layout.library_path("/etc/passwd").is_err());
        assert!(layout.library_path("").is_err());
        assert!(layout.asset_index_path("../17").is_err());
        assert!(layout.asset_object_path("zz/../..").is_err());
    }

    #[test]
    fn release_ids_must_be_one_segment() {
        assert!(InstallLayout::check_release_id("1.20.4").is_ok());
        assert!(InstallLayout::check_release_id("24w14a").is_ok());
        for bad in ["", "..", "../x", "a/b", "/abs", "a\\b", "."] {
            assert!(
                matches!(
                    InstallLayout::check_release_id(bad),
                    Err(LauncherError::UnsafePath(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn asset_objects_are_sharded_by_hash_prefix() {
        let layout = InstallLayout::new("/games/mc");
        let hash = "bdf48ef6b5d0d23bbb02e17d04865216179f510a";
        assert_eq!(
            layout.asset_object_path(hash).unwrap(),
            PathBuf::from(format!("/games/mc/assets/objects/bd/{hash}"))
        );
    }
}
