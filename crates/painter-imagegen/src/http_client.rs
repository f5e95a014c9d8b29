use std::time::Duration;

use reqwest::Client;

use crate::error::{ImageGenError, Result};

/// Connection establishment never waits longer than this, even with a long request timeout
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client shared by all providers of one generator
///
/// `timeout` bounds the whole outbound call so a stalled provider cannot hold
/// a handler indefinitely.
pub(crate) fn build(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .pool_idle_timeout(Some(Duration::from_secs(30)))
        .tcp_nodelay(true)
        .user_agent(concat!("painter/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ImageGenError::Configuration(format!("failed to build HTTP client: {e}")))
}
