//! HTTP fetcher that reaches source URLs through a CORS relay.
//!
//! The target URL is percent-encoded and appended to the relay endpoint, so
//! `https://example.com/list.txt` becomes
//! `https://api.allorigins.win/raw?url=https%3A%2F%2Fexample.com%2Flist.txt`.
//!
//! No request deadline is set: the retry schedule and the session's
//! cancellation token bound how long a fetch can take.

use super::{FetchError, FetchResponse, Fetcher};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped in a URI component: everything except
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Relay endpoint used when none is configured.
pub const DEFAULT_RELAY_ENDPOINT: &str = "https://api.allorigins.win/raw?url=";

/// Fetcher backed by reqwest.
#[derive(Debug, Clone)]
pub struct RelayFetcher {
    client: reqwest::Client,
    relay_endpoint: String,
}

impl RelayFetcher {
    /// Create a fetcher for the given relay endpoint.
    pub fn new(relay_endpoint: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("twinsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self {
            client,
            relay_endpoint: relay_endpoint.to_string(),
        })
    }

    /// The relay endpoint prefix.
    pub fn relay_endpoint(&self) -> &str {
        &self.relay_endpoint
    }

    /// Build the relayed URL for a target.
    pub fn relay_url(&self, target: &str) -> String {
        format!(
            "{}{}",
            self.relay_endpoint,
            utf8_percent_encode(target, COMPONENT)
        )
    }
}

#[async_trait]
impl Fetcher for RelayFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let relayed = self.relay_url(url);
        tracing::debug!("GET {}", relayed);

        let response = self
            .client
            .get(&relayed)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Ok(FetchResponse::new(status.as_u16(), String::new()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(FetchResponse::new(status.as_u16(), body))
    }
}
