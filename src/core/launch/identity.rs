use uuid::Uuid;

use crate::core::error::{LauncherError, LauncherResult};

/// Placeholder session token for offline play.
pub const OFFLINE_ACCESS_TOKEN: &str = "0";
pub const OFFLINE_USER_TYPE: &str = "legacy";

const MAX_USERNAME_LEN: usize = 16;

/// An offline player: validated name plus the name-derived UUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineIdentity {
    pub username: String,
    pub uuid: Uuid,
}

impl OfflineIdentity {
    pub fn new(username: &str) -> LauncherResult<Self> {
        let username = username.trim();
        if !is_valid_username(username) {
            return Err(LauncherError::InvalidUsername(username.to_string()));
        }
        Ok(Self {
            username: username.to_string(),
            uuid: offline_uuid(username),
        })
    }

    /// Dashed form, as passed to `--uuid`.
    pub fn uuid_string(&self) -> String {
        self.uuid.hyphenated().to_string()
    }
}

pub fn is_valid_username(name: &str) -> bool {
    (1..=MAX_USERNAME_LEN).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Name-based (v3) UUID of `OfflinePlayer:<name>` in the DNS namespace.
/// The same name always yields the same UUID, so local saves follow the
/// player across launches.
pub fn offline_uuid(username: &str) -> Uuid {
    Uuid::new_v3(
        &Uuid::NAMESPACE_DNS,
        format!("OfflinePlayer:{username}").as_bytes(),
    )
}
