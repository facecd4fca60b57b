use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the launcher core.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Refusing to write outside the install root: {0}")]
    UnsafePath(String),

    // ── Network ─────────────────────────────────────────
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        source: reqwest::Error,
    },

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Manifest ────────────────────────────────────────
    #[error("Version {0} not found in manifest")]
    VersionNotFound(String),

    #[error("Version {0} has no client download")]
    MissingClientDownload(String),

    #[error("Malformed JSON from {url}: {source}")]
    Parse {
        url: String,
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {url} ({path:?}): expected {expected}, got {actual}")]
    Sha1Mismatch {
        url: String,
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Archive ─────────────────────────────────────────
    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Launch ──────────────────────────────────────────
    #[error("Invalid username {0:?}: use 1-16 letters, digits or underscores")]
    InvalidUsername(String),

    #[error("Java executable not found: {0:?}")]
    JavaNotFound(PathBuf),

    #[error("Failed to start {program:?}: {source}")]
    ProcessSpawn {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("Game exited with code {code:?}\n{output}")]
    ProcessExited { code: Option<i32>, output: String },

    // ── Tasks ───────────────────────────────────────────
    #[error("Background task failed: {0}")]
    Task(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl LauncherError {
    /// Attach a path to an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach the request URL to a transport error.
    pub fn network(url: &str, source: reqwest::Error) -> Self {
        LauncherError::Network {
            url: url.to_string(),
            source,
        }
    }
}

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl From<tokio::task::JoinError> for LauncherError {
    fn from(error: tokio::task::JoinError) -> Self {
        LauncherError::Task(error.to_string())
    }
}
