pub mod client;
pub mod progress;

pub use client::{
    file_sha1, sha1_hex, ArtifactKind, DownloadEntry, Downloader, FetchOutcome, FetchSummary,
};
pub use progress::{InstallObserver, NoopObserver};
