//! Fetch abstraction for twinsync.
//!
//! This module provides a pluggable fetch layer that abstracts the
//! underlying HTTP mechanism (reqwest through a CORS relay, mock for testing).
//!
//! # Design
//!
//! The fetcher trait is async and request-oriented: `get()` either returns
//! a response (ok or not) or a transport error. Retrying, backoff and
//! cancellation live above this layer, in [`crate::retry`].
//!
//! # Example
//!
//! ```ignore
//! let fetcher = MockFetcher::new();
//! fetcher.respond("https://example.com/list", 200, "10.0.0.1:80");
//! let response = fetcher.get("https://example.com/list").await?;
//! assert!(response.ok());
//! ```

mod mock;
mod relay;

pub use mock::{MockFetcher, MockReply};
pub use relay::{RelayFetcher, DEFAULT_RELAY_ENDPOINT};

use async_trait::async_trait;
use thiserror::Error;

/// Fetch errors.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Request(String),

    /// The HTTP client could not be built.
    #[error("client setup failed: {0}")]
    Client(String),
}

/// Response to a single GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

impl FetchResponse {
    /// Create a new response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check for an ok (2xx) status.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetcher trait for retrieving remote proxy lists.
///
/// Implementations handle the underlying request mechanism
/// (relayed HTTP, mock, etc).
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET the given URL.
    ///
    /// Non-ok statuses are returned as responses, not errors.
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;
}
