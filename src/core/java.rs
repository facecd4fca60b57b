use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};

fn java_binary_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "java.exe"
    } else {
        "java"
    }
}

/// Well-known install locations, most preferred first.
fn well_known_candidates() -> Vec<PathBuf> {
    if cfg!(target_os = "macos") {
        [
            "/opt/homebrew/opt/openjdk@17/bin/java",
            "/opt/homebrew/opt/openjdk/bin/java",
            "/usr/local/opt/openjdk@17/bin/java",
            "/Library/Java/JavaVirtualMachines/temurin-17.jdk/Contents/Home/bin/java",
        ]
        .iter()
        .map(PathBuf::from)
        .collect()
    } else if cfg!(target_os = "windows") {
        let program_files = std::env::var_os("PROGRAMFILES")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\Program Files"));
        vec![
            program_files.join("Java").join("jdk-17").join("bin").join("java.exe"),
            program_files
                .join("Eclipse Adoptium")
                .join("jdk-17")
                .join("bin")
                .join("java.exe"),
        ]
    } else {
        [
            "/usr/lib/jvm/java-17-openjdk/bin/java",
            "/usr/lib/jvm/java-17-openjdk-amd64/bin/java",
        ]
        .iter()
        .map(PathBuf::from)
        .collect()
    }
}

/// Pick the Java executable to launch with.
///
/// Order: `preferred` (must exist), `$JAVA_HOME/bin/java`, well-known
/// locations, then plain `java` resolved through `PATH` at spawn time.
pub fn resolve_java(preferred: Option<&Path>) -> LauncherResult<PathBuf> {
    let java_home = std::env::var_os("JAVA_HOME").map(PathBuf::from);
    resolve_java_from(preferred, java_home.as_deref(), &well_known_candidates())
}

fn resolve_java_from(
    preferred: Option<&Path>,
    java_home: Option<&Path>,
    candidates: &[PathBuf],
) -> LauncherResult<PathBuf> {
    if let Some(path) = preferred {
        if path.is_file() {
            info!("Using configured Java: {:?}", path);
            return Ok(path.to_path_buf());
        }
        return Err(LauncherError::JavaNotFound(path.to_path_buf()));
    }

    if let Some(home) = java_home.filter(|home| !home.as_os_str().is_empty()) {
        let java = home.join("bin").join(java_binary_name());
        if java.is_file() {
            info!("Using Java from JAVA_HOME: {:?}", java);
            return Ok(java);
        }
        debug!("JAVA_HOME set but {:?} is missing", java);
    }

    if let Some(found) = candidates.iter().find(|path| path.is_file()) {
        info!("Found Java at {:?}", found);
        return Ok(found.clone());
    }

    debug!("No Java found in known locations, falling back to PATH");
    Ok(PathBuf::from(java_binary_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_java(dir: &Path) -> PathBuf {
        let bin = dir.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let java = bin.join(java_binary_name());
        std::fs::write(&java, b"").unwrap();
        java
    }

    #[test]
    fn explicit_path_wins_or_fails() {
        let temp = tempfile::tempdir().unwrap();
        let java = fake_java(temp.path());
        assert_eq!(resolve_java_from(Some(&java), None, &[]).unwrap(), java);

        let missing = temp.path().join("nope");
        assert!(matches!(
            resolve_java_from(Some(&missing), None, &[]),
            Err(LauncherError::JavaNotFound(p)) if p == missing
        ));
    }

    #[test]
    fn java_home_before_candidates() {
        let home = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let from_home = fake_java(home.path());
        let candidate = fake_java(other.path());

        assert_eq!(
            resolve_java_from(None, Some(home.path()), &[candidate.clone()]).unwrap(),
            from_home
        );
        assert_eq!(
            resolve_java_from(None, Some(Path::new("/does/not/exist")), &[candidate.clone()])
                .unwrap(),
            candidate
        );
    }

    #[test]
    fn falls_back_to_path_lookup() {
        let resolved =
            resolve_java_from(None, None, &[PathBuf::from("/does/not/exist/java")]).unwrap();
        assert_eq!(resolved, PathBuf::from(java_binary_name()));
    }
}
