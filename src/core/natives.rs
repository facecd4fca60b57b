// ─── Native Extraction ───
// Pulls platform shared libraries out of classifier archives into
// versions/<id>/natives.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};

/// Member suffixes treated as native libraries.
pub const NATIVE_SUFFIXES: &[&str] = &[".so", ".dll", ".dylib", ".jnilib"];

const METADATA_PREFIX: &str = "META-INF/";

pub fn is_native_member(name: &str) -> bool {
    !name.starts_with(METADATA_PREFIX)
        && NATIVE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Extract the native members of `archive` into `dest_dir`, keeping each
/// member's relative path. Returns how many files were written.
///
/// Per-member failures are logged and skipped. An archive that cannot be
/// opened at all is an error.
pub async fn extract_natives(archive: &Path, dest_dir: &Path) -> LauncherResult<usize> {
    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| LauncherError::io(dest_dir, e))?;

    let bytes = tokio::fs::read(archive)
        .await
        .map_err(|e| LauncherError::io(archive, e))?;

    let dest_dir = dest_dir.to_path_buf();
    let archive_debug = archive.to_path_buf();
    tokio::task::spawn_blocking(move || extract_from_bytes(bytes, &dest_dir, &archive_debug))
        .await?
}

/// Extract every archive in order. Archives that fail to open are skipped
/// with a warning so one broken classifier does not block a launch.
pub async fn extract_all(archives: &[PathBuf], dest_dir: &Path) -> LauncherResult<usize> {
    let mut total = 0;
    for archive in archives {
        match extract_natives(archive, dest_dir).await {
            Ok(count) => total += count,
            Err(LauncherError::Zip(e)) => {
                warn!("Cannot open native archive {:?}: {}", archive, e);
            }
            Err(e) => return Err(e),
        }
    }
    debug!("Extracted {} native files into {:?}", total, dest_dir);
    Ok(total)
}

fn extract_from_bytes(bytes: Vec<u8>, dest_dir: &Path, archive: &Path) -> LauncherResult<usize> {
    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(bytes))?;
    let mut written = 0;

    for i in 0..zip.len() {
        let mut member = match zip.by_index(i) {
            Ok(member) => member,
            Err(e) => {
                warn!("Skipping unreadable member #{} in {:?}: {}", i, archive, e);
                continue;
            }
        };
        if member.is_dir() || !is_native_member(member.name()) {
            continue;
        }
        // Rejects absolute names and `..` traversal.
        let Some(relative) = member.enclosed_name() else {
            warn!("Skipping unsafe member {:?} in {:?}", member.name(), archive);
            continue;
        };
        let dest = dest_dir.join(relative);

        let mut contents = Vec::with_capacity(member.size() as usize);
        if let Err(e) = member.read_to_end(&mut contents) {
            warn!("Failed to read {:?} from {:?}: {}", dest, archive, e);
            continue;
        }
        if let Some(parent) = dest.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Failed to create {:?}: {}", parent, e);
                continue;
            }
        }
        match std::fs::write(&dest, &contents) {
            Ok(()) => written += 1,
            Err(e) => warn!("Failed to write native {:?}: {}", dest, e),
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, data) in members {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn suffix_filter() {
        assert!(is_native_member("liblwjgl.so"));
        assert!(is_native_member("lwjgl64.dll"));
        assert!(is_native_member("macos/libglfw.dylib"));
        assert!(is_native_member("libjinput-osx.jnilib"));
        assert!(!is_native_member("META-INF/native.so"));
        assert!(!is_native_member("META-INF/MANIFEST.MF"));
        assert!(!is_native_member("org/lwjgl/Sys.class"));
    }

    #[tokio::test]
    async fn extracts_only_native_members() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("natives-linux.jar");
        std::fs::write(
            &archive,
            build_zip(&[
                ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0"),
                ("META-INF/sig.so", b"nope"),
                ("liblwjgl64.so", b"elf"),
                ("libopenal64.so", b"elf2"),
                ("readme.txt", b"hi"),
            ]),
        )
        .unwrap();

        let dest = temp.path().join("natives");
        let count = extract_natives(&archive, &dest).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(std::fs::read(dest.join("liblwjgl64.so")).unwrap(), b"elf");
        assert!(dest.join("libopenal64.so").exists());
        assert!(!dest.join("readme.txt").exists());
        assert!(!dest.join("META-INF").exists());

        // Running again rewrites the same set.
        assert_eq!(extract_natives(&archive, &dest).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn traversal_members_are_skipped() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("evil.jar");
        std::fs::write(
            &archive,
            build_zip(&[("../escape.so", b"x"), ("ok.dll", b"y")]),
        )
        .unwrap();

        let dest = temp.path().join("out");
        assert_eq!(extract_natives(&archive, &dest).await.unwrap(), 1);
        assert!(!temp.path().join("escape.so").exists());
        assert!(dest.join("ok.dll").exists());
    }

    #[tokio::test]
    async fn broken_archive_is_skipped_by_extract_all() {
        let temp = tempfile::tempdir().unwrap();
        let broken = temp.path().join("broken.jar");
        std::fs::write(&broken, b"not a zip").unwrap();
        let good = temp.path().join("good.jar");
        std::fs::write(&good, build_zip(&[("a.so", b"1")])).unwrap();

        let dest = temp.path().join("natives");
        assert!(matches!(
            extract_natives(&broken, &dest).await,
            Err(LauncherError::Zip(_))
        ));
        let total = extract_all(&[broken, good], &dest).await.unwrap();
        assert_eq!(total, 1);
    }
}
