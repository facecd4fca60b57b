use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::progress::InstallObserver;
use crate::core::error::{LauncherError, LauncherResult};

/// What a planned file is, for status messages and for picking out the
/// archives that need native extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Client,
    Library,
    Native,
    AssetIndex,
    AssetObject,
}

/// A single file to download with optional SHA-1 for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadEntry {
    pub url: String,
    pub dest: PathBuf,
    pub sha1: Option<String>,
    pub size: Option<u64>,
    pub kind: ArtifactKind,
}

impl DownloadEntry {
    pub fn file_name(&self) -> String {
        self.dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.url.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Destination already held the expected content; no request was made.
    Cached,
    Downloaded { bytes: u64 },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    pub downloaded: usize,
    pub cached: usize,
    pub bytes: u64,
}

/// Sequential, SHA-1 validated downloader.
///
/// Content is streamed into a sibling temporary file and only renamed onto
/// the destination once the digest has been verified, so a destination
/// path never holds partial or mismatching content.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

static PART_COUNTER: AtomicU64 = AtomicU64::new(0);

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    // ── Single file download ────────────────────────────

    /// Fetch `url` into `dest`.
    ///
    /// Idempotent: when `dest` already exists and matches `sha1_expected`
    /// (or no digest is declared) nothing is requested.
    pub async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
        observer: &dyn InstallObserver,
    ) -> LauncherResult<FetchOutcome> {
        if is_cached(dest, sha1_expected).await? {
            debug!("Cache hit: {:?}", dest);
            return Ok(FetchOutcome::Cached);
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        let response = self
            .client
            .get(url)
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

        let total_bytes = response.content_length().filter(|len| *len > 0);
        observer.on_progress(0.0);

        let part = part_path(dest);
        let (actual, bytes) = match stream_to_file(response, url, &part, total_bytes, observer).await
        {
            Ok(result) => result,
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                return Err(e);
            }
        };

        if let Some(expected) = sha1_expected {
            if !actual.eq_ignore_ascii_case(expected) {
                let _ = tokio::fs::remove_file(&part).await;
                return Err(LauncherError::Sha1Mismatch {
                    url: url.to_string(),
                    path: dest.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        tokio::fs::rename(&part, dest)
            .await
            .map_err(|e| LauncherError::io(dest, e))?;
        observer.on_progress(1.0);

        debug!("Downloaded: {} -> {:?} ({} bytes)", url, dest, bytes);
        Ok(FetchOutcome::Downloaded { bytes })
    }

    // ── Plan execution ──────────────────────────────────

    /// Fetch every entry in order. The first failure aborts the run;
    /// files already in place stay there, so a rerun resumes.
    pub async fn fetch_all(
        &self,
        entries: &[DownloadEntry],
        observer: &dyn InstallObserver,
    ) -> LauncherResult<FetchSummary> {
        info!("Fetching {} files", entries.len());

        let mut summary = FetchSummary::default();
        for (index, entry) in entries.iter().enumerate() {
            observer.on_status(&format!(
                "Downloading {} ({}/{})",
                entry.file_name(),
                index + 1,
                entries.len()
            ));

            match self
                .fetch(&entry.url, &entry.dest, entry.sha1.as_deref(), observer)
                .await?
            {
                FetchOutcome::Cached => summary.cached += 1,
                FetchOutcome::Downloaded { bytes } => {
                    summary.downloaded += 1;
                    summary.bytes += bytes;
                }
            }
        }

        info!(
            "{} files downloaded ({} bytes), {} already present",
            summary.downloaded, summary.bytes, summary.cached
        );
        Ok(summary)
    }
}

async fn stream_to_file(
    response: reqwest::Response,
    url: &str,
    part: &Path,
    total_bytes: Option<u64>,
    observer: &dyn InstallObserver,
) -> LauncherResult<(String, u64)> {
    let mut hasher = Sha1::new();
    let mut downloaded: u64 = 0;

    // Keep the handle scoped so it is closed before the rename.
    {
        let mut file = tokio::fs::File::create(part)
            .await
            .map_err(|e| LauncherError::io(part, e))?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| LauncherError::network(url, e))?;
            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .map_err(|e| LauncherError::io(part, e))?;
            downloaded += chunk.len() as u64;

            if let Some(total) = total_bytes {
                let fraction = (downloaded as f64 / total as f64).min(1.0);
                observer.on_progress(fraction as f32);
            }
        }

        file.flush().await.map_err(|e| LauncherError::io(part, e))?;
    }

    Ok((hex::encode(hasher.finalize()), downloaded))
}

/// Unique per call so concurrent fetches of the same file never share a
/// temporary.
fn part_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let n = PART_COUNTER.fetch_add(1, Ordering::Relaxed);
    dest.with_file_name(format!("{}.{}-{}.part", name, std::process::id(), n))
}

async fn is_cached(dest: &Path, sha1_expected: Option<&str>) -> LauncherResult<bool> {
    match tokio::fs::metadata(dest).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Ok(false),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(LauncherError::io(dest, e)),
    }

    match sha1_expected {
        None => Ok(true),
        Some(expected) => Ok(file_sha1(dest).await?.eq_ignore_ascii_case(expected)),
    }
}

/// Hex SHA-1 of a file's full content.
pub async fn file_sha1(path: &Path) -> LauncherResult<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| LauncherError::io(path, e))?;
    Ok(sha1_hex(&bytes))
}

pub fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_of_known_input() {
        assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn part_files_sit_next_to_destination() {
        let dest = Path::new("/tmp/libs/a.jar");
        let first = part_path(dest);
        let second = part_path(dest);
        assert_eq!(first.parent(), dest.parent());
        assert!(first.to_string_lossy().ends_with(".part"));
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn existing_file_with_matching_digest_is_cached() {
        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("lib.jar");
        std::fs::write(&dest, b"abc").unwrap();

        assert!(is_cached(&dest, Some("A9993E364706816ABA3E25717850C26C9CD0D89D"))
            .await
            .unwrap());
        assert!(!is_cached(&dest, Some("0000000000000000000000000000000000000000"))
            .await
            .unwrap());
        assert!(is_cached(&dest, None).await.unwrap());
        assert!(!is_cached(&temp.path().join("missing.jar"), None)
            .await
            .unwrap());
        // A directory is never a valid artifact.
        assert!(!is_cached(temp.path(), None).await.unwrap());
    }
}
