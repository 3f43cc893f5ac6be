//! Retry-fetch unit: one side's bounded, cancellable fetch loop.
//!
//! The loop feeds events into the side's state machine and executes the
//! actions it returns. Every await point (the request itself and each
//! backoff sleep) races the session's cancellation token.

use crate::error::SyncError;
use crate::fetch::Fetcher;
use crate::log::LogBuffer;
use crate::side::SideSlot;
use tokio_util::sync::CancellationToken;
use twinsync_core::{Action, FetchFailure, RetryPolicy, SourceEvent};
use twinsync_types::Severity;

/// Fetch one side's source, retrying with exponential backoff.
///
/// Returns `Ok(Some(body))` on success and `Ok(None)` when the URL is empty
/// or every attempt failed. Cancellation is reported as
/// [`SyncError::Cancelled`] and is never logged here as a retry failure.
pub async fn fetch_with_retry(
    fetcher: &dyn Fetcher,
    url: &str,
    slot: &SideSlot,
    policy: &RetryPolicy,
    token: &CancellationToken,
    log: &LogBuffer,
) -> Result<Option<String>, SyncError> {
    let url = url.trim();
    if url.is_empty() {
        return Ok(None);
    }

    let side = slot.side();
    let total = policy.attempts();
    slot.apply(SourceEvent::SessionStarted, policy);

    for attempt in 0..total {
        if token.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        slot.apply(SourceEvent::AttemptStarted { attempt }, policy);
        log.record(
            format!("{}: fetching source (attempt {}/{})", side, attempt + 1, total),
            Severity::Info,
        );

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(SyncError::Cancelled),
            result = fetcher.get(url) => result,
        };

        let mut body = None;
        let event = match result {
            Ok(response) if response.ok() => {
                body = Some(response.body);
                SourceEvent::FetchSucceeded
            }
            Ok(response) => SourceEvent::FetchFailed {
                attempt,
                failure: FetchFailure::Status(response.status),
            },
            Err(error) => SourceEvent::FetchFailed {
                attempt,
                failure: FetchFailure::Transport(error.to_string()),
            },
        };

        for action in slot.apply(event, policy) {
            match action {
                Action::Deliver => return Ok(body.take()),
                Action::ReportFailure { attempt, failure } => {
                    log.record(
                        format!(
                            "{}: attempt {}/{} failed ({})",
                            side,
                            attempt + 1,
                            total,
                            failure
                        ),
                        Severity::Warning,
                    );
                }
                Action::Backoff { delay } => {
                    tracing::debug!(side = %side, delay_ms = delay.as_millis() as u64, "backing off");
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => return Err(SyncError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Action::GiveUp { attempts } => {
                    log.record(
                        format!("{}: source unreachable after {} attempt(s)", side, attempts),
                        Severity::Error,
                    );
                    return Ok(None);
                }
            }
        }
    }

    Ok(None)
}
