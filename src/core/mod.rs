// ─── CTLauncher Core ───
// Manifest-driven install and launch for vanilla releases.
//
// Architecture:
//   core/
//     version/     version manifest, release descriptor, OS rules
//     resolver     descriptor fetch + platform filtering + download plan
//     downloader/  idempotent SHA-1 verified fetches with progress
//     natives      native library extraction from classifier archives
//     assets/      asset index objects (opt-in)
//     install      resolve → fetch → extract sequence
//     launch/      offline identity, classpath, argument vector, process
//     java         Java executable discovery
//     config       persisted launcher settings
//     tasks        background actions reporting to one foreground loop

pub mod assets;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod install;
pub mod java;
pub mod launch;
pub mod layout;
pub mod natives;
pub mod resolver;
pub mod tasks;
pub mod version;
