//! Fixed-interval polling for long-running provisioning operations.
//!
//! Cluster builds take minutes; [`wait_for_status`] refetches the resource
//! on a fixed interval until its status lands in a terminal set, reporting
//! each observation through an optional callback so callers can drive
//! spinners or log lines without the loop knowing about either.

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Error, Result};

/// Events emitted during a wait loop.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The loop is about to make its first fetch.
    Started { resource_id: String },
    /// One fetch completed; the resource reported `status`.
    Polling {
        resource_id: String,
        status: String,
        elapsed_minutes: f64,
    },
    /// A terminal status was observed and the loop is returning.
    Finished {
        resource_id: String,
        status: String,
    },
}

/// Callback for progress updates during wait operations.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Anything with a current status string the wait loop can inspect.
pub trait StatusSource {
    fn status(&self) -> &str;
}

/// Minutes elapsed between two instants. Pure so the arithmetic is
/// testable without a clock.
#[must_use]
pub fn elapsed_minutes(start: Instant, now: Instant) -> f64 {
    now.saturating_duration_since(start).as_secs_f64() / 60.0
}

fn emit(callback: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}

/// Poll `fetch` until it returns a resource whose status is in `terminal`.
///
/// Each iteration fetches, reports the observed status, and returns the
/// resource if the status is terminal; otherwise it sleeps for `interval`
/// and fetches again. Observing statuses `S1..Sn` with only `Sn` terminal
/// therefore costs exactly n fetches and n-1 sleeps.
///
/// A fetch failure aborts the loop and propagates unchanged. When `timeout`
/// is set and the deadline passes without a terminal status, the loop stops
/// with [`Error::WaitTimeout`].
pub async fn wait_for_status<T, F, Fut>(
    resource_id: &str,
    terminal: &[&str],
    interval: Duration,
    timeout: Option<Duration>,
    on_progress: Option<&ProgressCallback>,
    mut fetch: F,
) -> Result<T>
where
    T: StatusSource,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let start = Instant::now();
    emit(
        on_progress,
        ProgressEvent::Started {
            resource_id: resource_id.to_string(),
        },
    );

    loop {
        let resource = fetch().await?;
        let status = resource.status().to_string();
        let elapsed = elapsed_minutes(start, Instant::now());
        debug!(resource_id, %status, elapsed_minutes = elapsed, "poll");
        emit(
            on_progress,
            ProgressEvent::Polling {
                resource_id: resource_id.to_string(),
                status: status.clone(),
                elapsed_minutes: elapsed,
            },
        );

        if terminal.contains(&status.as_str()) {
            emit(
                on_progress,
                ProgressEvent::Finished {
                    resource_id: resource_id.to_string(),
                    status,
                },
            );
            return Ok(resource);
        }

        if let Some(limit) = timeout {
            if start.elapsed() >= limit {
                return Err(Error::WaitTimeout(limit));
            }
        }
        tokio::time::sleep(interval).await;
    }
}
