//! Mock fetcher for testing.
//!
//! Allows scripting replies per URL and capturing requests for verification.

use super::{FetchError, FetchResponse, Fetcher};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// A scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Return a response with this status and body.
    Respond {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// Fail with a transport error.
    Fail(String),
    /// Never complete (until the caller gives up on the request).
    Hang,
}

/// Mock fetcher for testing.
///
/// Replies queued for a URL are consumed in order; once the queue is empty
/// the URL's fallback reply is used, and without one the request fails.
#[derive(Debug, Default)]
pub struct MockFetcher {
    inner: Arc<Mutex<MockFetcherInner>>,
}

#[derive(Debug, Default)]
struct MockFetcherInner {
    queued: HashMap<String, VecDeque<MockReply>>,
    fallback: HashMap<String, MockReply>,
    requests: Vec<String>,
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next request to `url`.
    pub fn queue(&self, url: &str, reply: MockReply) {
        let mut inner = crate::lock(&self.inner);
        inner
            .queued
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Queue a response for the next request to `url`.
    pub fn respond(&self, url: &str, status: u16, body: &str) {
        self.queue(
            url,
            MockReply::Respond {
                status,
                body: body.to_string(),
            },
        );
    }

    /// Queue a transport failure for the next request to `url`.
    pub fn fail(&self, url: &str, error: &str) {
        self.queue(url, MockReply::Fail(error.to_string()));
    }

    /// Reply used for `url` once its queue is exhausted.
    pub fn set_fallback(&self, url: &str, reply: MockReply) {
        let mut inner = crate::lock(&self.inner);
        inner.fallback.insert(url.to_string(), reply);
    }

    /// All requested URLs, in order.
    pub fn requests(&self) -> Vec<String> {
        let inner = crate::lock(&self.inner);
        inner.requests.clone()
    }

    /// Number of requests made to `url`.
    pub fn request_count(&self, url: &str) -> usize {
        let inner = crate::lock(&self.inner);
        inner.requests.iter().filter(|u| *u == url).count()
    }

    /// Clear all state (scripts and captured requests).
    pub fn reset(&self) {
        let mut inner = crate::lock(&self.inner);
        *inner = MockFetcherInner::default();
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let reply = {
            let mut inner = crate::lock(&self.inner);
            inner.requests.push(url.to_string());

            let queued = inner.queued.get_mut(url).and_then(VecDeque::pop_front);
            queued.or_else(|| inner.fallback.get(url).cloned())
        };

        match reply {
            Some(MockReply::Respond { status, body }) => Ok(FetchResponse::new(status, body)),
            Some(MockReply::Fail(error)) => Err(FetchError::Request(error)),
            Some(MockReply::Hang) => std::future::pending().await,
            None => Err(FetchError::Request(format!("no scripted reply for {}", url))),
        }
    }
}
