pub mod descriptor;
pub mod manifest;
pub mod rules;

pub use descriptor::{
    AssetIndexInfo, DownloadArtifact, LibraryArtifact, LibraryDownloads, LibraryEntry,
    ReleaseDescriptor, ReleaseDownloads, FALLBACK_MAIN_CLASS,
};
pub use manifest::{VersionEntry, VersionManifest, VersionType};
pub use rules::{evaluate_rules, Arch, OsConstraint, OsName, Platform, Rule, RuleAction};
