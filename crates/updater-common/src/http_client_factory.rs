// Creates HTTP clients with a package user agent and bounded timeouts.
// Timeouts are the fetch-layer bound for the update cycle; a hung feed or
// download must not wedge the runner past these limits.

use anyhow::Result;
use reqwest::Client;
use std::time::Duration;

/// How long to wait for a connection to be established.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request deadline, sized for artifact downloads.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Creates properly configured HTTP clients for the updater.
pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Create a new `reqwest::Client` with default updater settings.
    ///
    /// Proxy configuration is picked up from the standard `HTTP_PROXY` /
    /// `HTTPS_PROXY` / `NO_PROXY` environment variables by reqwest itself.
    pub fn create_client() -> Result<Client> {
        let client = Client::builder()
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(client)
    }
}
