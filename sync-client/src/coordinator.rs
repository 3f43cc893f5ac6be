//! Dual-source sync coordinator.
//!
//! One call to [`SyncCoordinator::synchronize`] is one session: a fresh
//! cancellation token, two retry-fetch units spawned together, and a single
//! aggregation step once both settle. A cancellation observed by either unit
//! ends the session for both.

use crate::error::SyncError;
use crate::fetch::Fetcher;
use crate::lock;
use crate::log::LogBuffer;
use crate::retry::fetch_with_retry;
use crate::side::SideSlot;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use twinsync_core::{filter_valid, RetryPolicy, SourceEvent, SourceState};
use twinsync_types::{Severity, Side, ValidationResult};

/// Message logged when the operator cancels a session.
pub const TERMINATED_MESSAGE: &str = "Sync session manually terminated by operator";

/// How a side's proxy list changed after a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideUpdate {
    /// Side that was updated.
    pub side: Side,
    /// Lines kept after filtering.
    pub valid: usize,
    /// Non-empty lines fetched.
    pub total: usize,
}

/// Result of a call to [`SyncCoordinator::synchronize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A session was already running; nothing was done.
    AlreadyActive,
    /// Neither side had a source URL.
    NoSources,
    /// Both units settled. Sides that delivered content are listed.
    Completed {
        /// Per-side list updates, in side order.
        updates: Vec<SideUpdate>,
    },
    /// The operator cancelled the session.
    Cancelled,
    /// The session failed unexpectedly.
    Failed(String),
}

impl SessionOutcome {
    /// List updates of a completed session (empty otherwise).
    pub fn updates(&self) -> &[SideUpdate] {
        match self {
            SessionOutcome::Completed { updates } => updates.as_slice(),
            _ => &[],
        }
    }
}

/// Ends the session when `synchronize` returns or its future is dropped:
/// cancels the token, returns pending sides to idle and clears the slot.
struct SessionGuard<'a> {
    slot: &'a Mutex<Option<CancellationToken>>,
    sides: &'a [Arc<SideSlot>; 2],
    policy: RetryPolicy,
    token: CancellationToken,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.token.cancel();
        for slot in self.sides {
            slot.apply(SourceEvent::SessionCancelled, &self.policy);
        }
        *lock(self.slot) = None;
    }
}

/// Coordinates the two sides' fetches and owns their proxy lists.
pub struct SyncCoordinator {
    fetcher: Arc<dyn Fetcher>,
    policy: RetryPolicy,
    log: LogBuffer,
    sides: [Arc<SideSlot>; 2],
    session: Mutex<Option<CancellationToken>>,
}

impl SyncCoordinator {
    /// Create a coordinator with empty proxy lists.
    pub fn new(fetcher: Arc<dyn Fetcher>, policy: RetryPolicy, log: LogBuffer) -> Self {
        Self::with_proxies(fetcher, policy, log, [String::new(), String::new()])
    }

    /// Create a coordinator with initial proxy lists for A and B.
    pub fn with_proxies(
        fetcher: Arc<dyn Fetcher>,
        policy: RetryPolicy,
        log: LogBuffer,
        proxies: [String; 2],
    ) -> Self {
        let [proxies_a, proxies_b] = proxies;
        Self {
            fetcher,
            policy,
            log,
            sides: [
                Arc::new(SideSlot::new(Side::A, proxies_a)),
                Arc::new(SideSlot::new(Side::B, proxies_b)),
            ],
            session: Mutex::new(None),
        }
    }

    /// Fetch both sources concurrently and replace the proxy lists with
    /// the valid lines each returned.
    ///
    /// Never fails: every problem is reported through the log and the
    /// returned outcome.
    pub async fn synchronize(&self, url_a: &str, url_b: &str) -> SessionOutcome {
        let urls = [url_a.trim().to_string(), url_b.trim().to_string()];

        let token = {
            let mut session = lock(&self.session);
            if session.is_some() || self.sides.iter().any(|slot| slot.state().is_active()) {
                tracing::debug!("synchronize ignored: session already active");
                return SessionOutcome::AlreadyActive;
            }
            if urls.iter().all(String::is_empty) {
                self.log.record(
                    "Sync aborted: no source URL configured for either cluster",
                    Severity::Error,
                );
                return SessionOutcome::NoSources;
            }
            let token = CancellationToken::new();
            *session = Some(token.clone());
            token
        };
        let _guard = SessionGuard {
            slot: &self.session,
            sides: &self.sides,
            policy: self.policy,
            token: token.clone(),
        };

        for slot in &self.sides {
            slot.apply(SourceEvent::SessionStarted, &self.policy);
        }
        self.log.record("Synchronizing clusters", Severity::Info);

        let mut units = JoinSet::new();
        for (slot, url) in self.sides.iter().zip(urls) {
            let fetcher = Arc::clone(&self.fetcher);
            let slot = Arc::clone(slot);
            let policy = self.policy;
            let token = token.clone();
            let log = self.log.clone();
            units.spawn(async move {
                let content =
                    fetch_with_retry(fetcher.as_ref(), &url, &slot, &policy, &token, &log).await;
                (slot.side(), content)
            });
        }

        let mut contents: [Option<String>; 2] = [None, None];
        let mut failure = None;
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok((side, Ok(content))) => contents[side.index()] = content,
                Ok((_, Err(error))) => {
                    failure = Some(error);
                    break;
                }
                Err(join_error) => {
                    failure = Some(SyncError::Task(join_error.to_string()));
                    break;
                }
            }
        }

        if let Some(error) = failure {
            token.cancel();
            units.abort_all();
            while units.join_next().await.is_some() {}
            return self.end_session(error);
        }

        let mut updates = Vec::new();
        for (slot, content) in self.sides.iter().zip(contents) {
            let Some(content) = content else {
                continue;
            };
            let side = slot.side();
            let filtered = filter_valid(&content);
            slot.set_proxies(filtered.joined());

            if filtered.kept.is_empty() {
                self.log.record(
                    format!(
                        "{}: source returned no valid proxy lines ({} examined)",
                        side, filtered.total
                    ),
                    Severity::Warning,
                );
            } else {
                self.log.record(
                    format!(
                        "{}: synchronized {}/{} proxies",
                        side,
                        filtered.kept.len(),
                        filtered.total
                    ),
                    Severity::Success,
                );
            }

            updates.push(SideUpdate {
                side,
                valid: filtered.kept.len(),
                total: filtered.total,
            });
        }

        SessionOutcome::Completed { updates }
    }

    /// Report a session that ended early and return still-pending sides to idle.
    fn end_session(&self, error: SyncError) -> SessionOutcome {
        for slot in &self.sides {
            slot.apply(SourceEvent::SessionCancelled, &self.policy);
        }

        if error.is_cancelled() {
            self.log.record(TERMINATED_MESSAGE, Severity::Warning);
            SessionOutcome::Cancelled
        } else {
            self.log
                .record(format!("Sync failed: {}", error), Severity::Error);
            SessionOutcome::Failed(error.to_string())
        }
    }

    /// Signal the active session's token. Returns false when no session is active.
    pub fn cancel(&self) -> bool {
        match lock(&self.session).as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Check if a session is running.
    pub fn is_active(&self) -> bool {
        lock(&self.session).is_some() || self.sides.iter().any(|slot| slot.state().is_active())
    }

    /// Fetch state of a side.
    pub fn state(&self, side: Side) -> SourceState {
        self.sides[side.index()].state()
    }

    /// Proxy list text of a side.
    pub fn proxies(&self, side: Side) -> String {
        self.sides[side.index()].proxies()
    }

    /// Replace a side's proxy list text (manual edit or import).
    pub fn set_proxies(&self, side: Side, text: impl Into<String>) {
        self.sides[side.index()].set_proxies(text);
    }

    /// Validate a side's proxy list text.
    pub fn validation(&self, side: Side) -> ValidationResult {
        self.sides[side.index()].validation()
    }

    /// The log this coordinator writes to.
    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    /// Retry policy applied to both sides.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, FetchResponse, MockFetcher, MockReply};
    use async_trait::async_trait;
    use std::time::Duration;

    const URL_A: &str = "https://lists.example/a.txt";
    const URL_B: &str = "https://lists.example/b.txt";

    fn coordinator(fetcher: &MockFetcher) -> SyncCoordinator {
        SyncCoordinator::new(
            Arc::new(fetcher.clone()),
            RetryPolicy::default(),
            LogBuffer::new(),
        )
    }

    fn terminated_count(log: &LogBuffer) -> usize {
        log.entries()
            .iter()
            .filter(|e| e.message.contains("manually terminated"))
            .count()
    }

    // ===========================================
    // Aggregation Tests
    // ===========================================

    #[tokio::test(start_paused = true)]
    async fn both_sides_filtered_and_replaced() {
        let fetcher = MockFetcher::new();
        fetcher.respond(URL_A, 200, "10.0.0.1:80\njunk\n\n10.0.0.2:8080\n");
        fetcher.respond(URL_B, 200, "192.168.1.1:3128");
        let coord = coordinator(&fetcher);

        let outcome = coord.synchronize(URL_A, URL_B).await;

        assert_eq!(
            outcome.updates(),
            &[
                SideUpdate {
                    side: Side::A,
                    valid: 2,
                    total: 3
                },
                SideUpdate {
                    side: Side::B,
                    valid: 1,
                    total: 1
                },
            ]
        );
        assert_eq!(coord.proxies(Side::A), "10.0.0.1:80\n10.0.0.2:8080");
        assert_eq!(coord.proxies(Side::B), "192.168.1.1:3128");
        assert_eq!(coord.state(Side::A), SourceState::Success);
        assert_eq!(coord.state(Side::B), SourceState::Success);
        assert!(coord
            .log()
            .entries()
            .iter()
            .any(|e| e.severity == Severity::Success && e.message.contains("2/3")));
        assert!(!coord.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn only_side_with_url_is_updated() {
        let fetcher = MockFetcher::new();
        fetcher.respond(URL_A, 200, "10.0.0.1:80");
        let coord = coordinator(&fetcher);
        coord.set_proxies(Side::B, "172.16.0.1:1080");

        let outcome = coord.synchronize(URL_A, "").await;

        assert_eq!(outcome.updates().len(), 1);
        assert_eq!(outcome.updates()[0].side, Side::A);
        assert_eq!(coord.proxies(Side::B), "172.16.0.1:1080");
        assert_eq!(coord.state(Side::B), SourceState::Idle);
        assert_eq!(fetcher.requests(), vec![URL_A]);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_valid_lines_logs_warning() {
        let fetcher = MockFetcher::new();
        fetcher.respond(URL_A, 200, "<html>rate limited</html>\nnope");
        let coord = coordinator(&fetcher);
        coord.set_proxies(Side::A, "10.0.0.1:80");

        let outcome = coord.synchronize(URL_A, "").await;

        assert_eq!(
            outcome.updates(),
            &[SideUpdate {
                side: Side::A,
                valid: 0,
                total: 2
            }]
        );
        assert_eq!(coord.proxies(Side::A), "");
        assert_eq!(coord.log().count(Severity::Warning), 1);
        assert_eq!(coord.log().count(Severity::Success), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_side_keeps_previous_list() {
        let fetcher = MockFetcher::new();
        fetcher.set_fallback(URL_A, MockReply::Fail("refused".into()));
        fetcher.respond(URL_B, 200, "10.0.0.9:9000");
        let coord = coordinator(&fetcher);
        coord.set_proxies(Side::A, "10.0.0.1:80");

        let outcome = coord.synchronize(URL_A, URL_B).await;

        assert_eq!(outcome.updates().len(), 1);
        assert_eq!(coord.state(Side::A), SourceState::Error);
        assert_eq!(coord.state(Side::B), SourceState::Success);
        assert_eq!(coord.proxies(Side::A), "10.0.0.1:80");
        assert_eq!(coord.log().count(Severity::Error), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_states_reset_on_next_session() {
        let fetcher = MockFetcher::new();
        for _ in 0..4 {
            fetcher.fail(URL_A, "down");
        }
        fetcher.respond(URL_A, 200, "10.0.0.1:80");
        let coord = coordinator(&fetcher);

        coord.synchronize(URL_A, "").await;
        assert_eq!(coord.state(Side::A), SourceState::Error);

        coord.synchronize(URL_A, "").await;
        assert_eq!(coord.state(Side::A), SourceState::Success);
        assert_eq!(fetcher.request_count(URL_A), 5);
    }

    // ===========================================
    // Guard Tests
    // ===========================================

    #[tokio::test(start_paused = true)]
    async fn both_urls_empty_fails_fast() {
        let fetcher = MockFetcher::new();
        let coord = coordinator(&fetcher);
        coord.set_proxies(Side::A, "10.0.0.1:80");

        let outcome = coord.synchronize("", "  ").await;

        assert_eq!(outcome, SessionOutcome::NoSources);
        assert_eq!(coord.log().len(), 1);
        assert_eq!(coord.log().count(Severity::Error), 1);
        assert!(fetcher.requests().is_empty());
        assert_eq!(coord.proxies(Side::A), "10.0.0.1:80");
        assert_eq!(coord.state(Side::A), SourceState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn synchronize_is_noop_while_active() {
        let fetcher = MockFetcher::new();
        fetcher.queue(URL_A, MockReply::Hang);
        let coord = coordinator(&fetcher);

        let (first, second) = tokio::join!(coord.synchronize(URL_A, ""), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let second = coord.synchronize(URL_A, URL_B).await;
            coord.cancel();
            second
        });

        assert_eq!(second, SessionOutcome::AlreadyActive);
        assert_eq!(first, SessionOutcome::Cancelled);
        assert_eq!(fetcher.requests(), vec![URL_A]);
    }

    #[test]
    fn cancel_without_session_is_noop() {
        let coord = coordinator(&MockFetcher::new());
        assert!(!coord.cancel());
        assert!(coord.log().is_empty());
    }

    // ===========================================
    // Cancellation Tests
    // ===========================================

    #[tokio::test(start_paused = true)]
    async fn cancellation_resets_pending_sides_to_idle() {
        let fetcher = MockFetcher::new();
        fetcher.queue(URL_A, MockReply::Hang);
        fetcher.set_fallback(URL_B, MockReply::Fail("refused".into()));
        let coord = coordinator(&fetcher);
        coord.set_proxies(Side::A, "10.0.0.1:80");

        let (outcome, cancelled) = tokio::join!(coord.synchronize(URL_A, URL_B), async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            coord.cancel()
        });

        assert!(cancelled);
        assert_eq!(outcome, SessionOutcome::Cancelled);
        assert_eq!(terminated_count(coord.log()), 1);
        assert_eq!(coord.log().count(Severity::Error), 0);
        assert_eq!(coord.state(Side::A), SourceState::Idle);
        assert_eq!(coord.state(Side::B), SourceState::Idle);
        assert_eq!(coord.proxies(Side::A), "10.0.0.1:80");
        assert!(!coord.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_session_releases_coordinator() {
        let fetcher = MockFetcher::new();
        fetcher.queue(URL_A, MockReply::Hang);
        fetcher.respond(URL_A, 200, "10.0.0.9:80");
        let coord = coordinator(&fetcher);

        let timed_out =
            tokio::time::timeout(Duration::from_secs(1), coord.synchronize(URL_A, "")).await;
        assert!(timed_out.is_err());
        assert_eq!(coord.state(Side::A), SourceState::Idle);
        assert!(!coord.is_active());
        assert!(!coord.cancel());

        let outcome = coord.synchronize(URL_A, "").await;
        assert_eq!(
            outcome.updates(),
            &[SideUpdate {
                side: Side::A,
                valid: 1,
                total: 1
            }]
        );
        assert_eq!(coord.proxies(Side::A), "10.0.0.9:80");
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_leaves_settled_side_alone() {
        let fetcher = MockFetcher::new();
        fetcher.set_fallback(URL_A, MockReply::Fail("refused".into()));
        fetcher.respond(URL_B, 200, "10.0.0.2:80");
        let coord = coordinator(&fetcher);

        let (outcome, _) = tokio::join!(coord.synchronize(URL_A, URL_B), async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            coord.cancel()
        });

        assert_eq!(outcome, SessionOutcome::Cancelled);
        assert_eq!(terminated_count(coord.log()), 1);
        assert_eq!(coord.state(Side::A), SourceState::Idle);
        assert_eq!(coord.state(Side::B), SourceState::Success);
        // The session was cancelled as a whole, so nothing is aggregated
        assert_eq!(coord.proxies(Side::B), "");
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_start_together() {
        let fetcher = MockFetcher::new();
        fetcher.set_fallback(URL_A, MockReply::Fail("refused".into()));
        fetcher.set_fallback(URL_B, MockReply::Fail("refused".into()));
        let coord = coordinator(&fetcher);

        let (_, counts) = tokio::join!(coord.synchronize(URL_A, URL_B), async {
            // Well inside the first 1.5s backoff of both sides
            tokio::time::sleep(Duration::from_millis(100)).await;
            let counts = (fetcher.request_count(URL_A), fetcher.request_count(URL_B));
            coord.cancel();
            counts
        });

        assert_eq!(counts, (1, 1));
    }

    // ===========================================
    // Unexpected Failure Tests
    // ===========================================

    struct PanickingFetcher;

    #[async_trait]
    impl Fetcher for PanickingFetcher {
        async fn get(&self, _url: &str) -> Result<FetchResponse, FetchError> {
            panic!("fetcher exploded");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn unexpected_failure_is_logged_not_raised() {
        let coord = SyncCoordinator::new(
            Arc::new(PanickingFetcher),
            RetryPolicy::default(),
            LogBuffer::new(),
        );

        let outcome = coord.synchronize(URL_A, "").await;

        assert!(matches!(outcome, SessionOutcome::Failed(_)));
        assert_eq!(coord.log().count(Severity::Error), 1);
        assert_eq!(terminated_count(coord.log()), 0);
        assert_eq!(coord.state(Side::A), SourceState::Idle);
        assert!(!coord.is_active());
    }
}
