use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;

use crate::core::error::LauncherResult;

const APP_USER_AGENT: &str = concat!("CTLauncher/", env!("CARGO_PKG_VERSION"));

/// Shared client for manifest, descriptor and artifact requests.
///
/// Compression is disabled so `Content-Length` reflects the bytes we
/// actually receive, which is what drives progress reporting. Only the
/// connect phase is bounded here; JSON requests set their own total
/// timeout, artifact bodies may take as long as they need.
pub fn build_http_client(connect_timeout_secs: u64) -> LauncherResult<Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    let client = Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .connect_timeout(Duration::from_secs(connect_timeout_secs.max(1)))
        .build()?;
    Ok(client)
}
