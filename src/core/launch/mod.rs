pub mod classpath;
pub mod command;
pub mod identity;
pub mod process;

pub use classpath::{build_classpath, classpath_entries, classpath_separator, ClientJarPosition};
pub use command::LaunchCommandBuilder;
pub use identity::{offline_uuid, OfflineIdentity};
pub use process::run_game;
