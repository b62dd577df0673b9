//! Poll a remote resource until it reaches a terminal state.
//!
//! A spawned worker task calls the fetch operation in a loop and hands the
//! first terminal snapshot (or the first fetch error) back through a
//! single-slot channel. The caller races that channel against the deadline.
//! Whichever resolves first wins; on deadline the worker is told to stop,
//! drops any in-flight fetch and exits before [`poll`] returns.

use std::{future::Future, time::Duration};

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::trace;

use crate::models::Progress;

/// Timeout used when [`PollOptions::timeout`] is unset.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// A resource whose processing state can be polled.
pub trait Pollable {
    fn progress(&self) -> &Progress;
}

/// How long to poll and how long to wait between attempts.
///
/// The default interval is zero: fetches are issued back-to-back, with only
/// a scheduler yield in between. Set an interval to go easier on the API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollOptions {
    pub timeout: Option<Duration>,
    pub interval: Duration,
}

impl PollOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Effective deadline, falling back to [`DEFAULT_POLL_TIMEOUT`]
    pub fn timeout(&self) -> Duration {
        match self.timeout {
            Some(timeout) if !timeout.is_zero() => timeout,
            _ => DEFAULT_POLL_TIMEOUT,
        }
    }
}

/// How a poll ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<R> {
    /// The resource reached `COMPLETED`.
    Completed(R),
    /// The resource reached `ERROR`. Processing failed remotely; polling did not.
    Failed(R),
    /// The deadline passed before a terminal state was observed.
    TimedOut,
}

impl<R> PollOutcome<R> {
    pub fn into_resource(self) -> Option<R> {
        match self {
            PollOutcome::Completed(r) | PollOutcome::Failed(r) => Some(r),
            PollOutcome::TimedOut => None,
        }
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, PollOutcome::TimedOut)
    }
}

impl<R: Pollable> PollOutcome<R> {
    fn terminal(resource: R) -> Self {
        match resource.progress() {
            Progress::Error => PollOutcome::Failed(resource),
            _ => PollOutcome::Completed(resource),
        }
    }
}

#[derive(Debug, Error)]
pub enum PollError<E> {
    #[error("no terminal state reached within {:.1}s", .0.as_secs_f64())]
    TimeoutExceeded(Duration),

    #[error("fetch failed: {0}")]
    FetchFailed(#[source] E),
}

/// Poll `reference` until it is `COMPLETED` or `ERROR`.
///
/// Both terminal states are returned as `Ok`; check the resource's progress
/// to tell them apart. A fetch error ends polling at once and is returned as
/// [`PollError::FetchFailed`]. Nothing is retried.
pub async fn poll<R, E, F, Fut>(
    reference: &str,
    fetch: F,
    options: &PollOptions,
) -> Result<R, PollError<E>>
where
    R: Pollable + Send + 'static,
    E: Send + 'static,
    F: Fn(String) -> Fut + Send + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    match poll_outcome(reference, fetch, options).await {
        Ok(outcome) => outcome
            .into_resource()
            .ok_or(PollError::TimeoutExceeded(options.timeout())),
        Err(e) => Err(PollError::FetchFailed(e)),
    }
}

/// Like [`poll`], but reports the deadline as [`PollOutcome::TimedOut`]
/// instead of an error.
pub async fn poll_outcome<R, E, F, Fut>(
    reference: &str,
    fetch: F,
    options: &PollOptions,
) -> Result<PollOutcome<R>, E>
where
    R: Pollable + Send + 'static,
    E: Send + 'static,
    F: Fn(String) -> Fut + Send + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    let (result_tx, result_rx) = oneshot::channel();
    let (stop_tx, stop_rx) = oneshot::channel();

    let worker = tokio::spawn(fetch_until_terminal(
        reference.to_string(),
        fetch,
        options.interval,
        stop_rx,
        result_tx,
    ));

    tokio::select! {
        delivered = result_rx => match delivered {
            Ok(Ok(resource)) => Ok(PollOutcome::terminal(resource)),
            Ok(Err(e)) => Err(e),
            // The worker only drops its sender without delivering when it panics.
            Err(_) => match worker.await {
                Err(join_err) if join_err.is_panic() => std::panic::resume_unwind(join_err.into_panic()),
                _ => Ok(PollOutcome::TimedOut),
            },
        },
        _ = tokio::time::sleep(options.timeout()) => {
            let _ = stop_tx.send(());
            // Wait for the worker to wind down so no fetch outlives this call.
            let _ = worker.await;
            Ok(PollOutcome::TimedOut)
        }
    }
}

async fn fetch_until_terminal<R, E, F, Fut>(
    reference: String,
    fetch: F,
    interval: Duration,
    mut stop: oneshot::Receiver<()>,
    result: oneshot::Sender<Result<R, E>>,
) where
    R: Pollable,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let mut attempt: u64 = 0;
    loop {
        attempt += 1;
        // A closed stop channel means the caller went away; treat it as a stop.
        let fetched = tokio::select! {
            biased;
            _ = &mut stop => return,
            fetched = fetch(reference.clone()) => fetched,
        };

        match fetched {
            Ok(resource) if resource.progress().is_terminal() => {
                let _ = result.send(Ok(resource));
                return;
            }
            Ok(resource) => {
                trace!(
                    reference = reference.as_str(),
                    attempt,
                    progress = resource.progress().as_str(),
                    "Resource not ready yet"
                );
            }
            Err(e) => {
                let _ = result.send(Err(e));
                return;
            }
        }

        if interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::select! {
                biased;
                _ = &mut stop => return,
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use tokio::time::Instant;

    #[derive(Debug, Clone, PartialEq)]
    struct Snapshot {
        progress: Progress,
        attempt: usize,
    }

    impl Pollable for Snapshot {
        fn progress(&self) -> &Progress {
            &self.progress
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct StubError(&'static str);

    enum Step {
        Progress(&'static str),
        Fail(&'static str),
    }

    /// A fetch stub that replays `script` and repeats its last step forever.
    fn scripted(
        script: Vec<Step>,
        calls: Arc<AtomicUsize>,
    ) -> impl Fn(String) -> std::pin::Pin<Box<dyn Future<Output = Result<Snapshot, StubError>> + Send>>
    + Send
    + 'static {
        let script = Arc::new(script);
        move |_reference: String| {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            let script = script.clone();
            Box::pin(async move {
                // Simulates network latency and gives the timer a chance to run.
                tokio::time::sleep(Duration::from_millis(1)).await;
                let step = &script[(attempt - 1).min(script.len() - 1)];
                match step {
                    Step::Progress(p) => Ok(Snapshot {
                        progress: Progress::from(*p),
                        attempt,
                    }),
                    Step::Fail(msg) => Err(StubError(msg)),
                }
            })
        }
    }

    fn options(timeout_ms: u64) -> PollOptions {
        PollOptions::default().with_timeout(Duration::from_millis(timeout_ms))
    }

    #[test]
    fn test_poll_options_default_timeout() {
        assert_eq!(PollOptions::default().timeout(), DEFAULT_POLL_TIMEOUT);
        assert_eq!(
            PollOptions::default().with_timeout(Duration::ZERO).timeout(),
            Duration::from_secs(30)
        );
        assert_eq!(options(250).timeout(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_completed_on_first_fetch_returns_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let started = Instant::now();

        let snapshot = poll(
            "https://api.gini.net/documents/1",
            scripted(vec![Step::Progress("COMPLETED")], calls.clone()),
            &options(5_000),
        )
        .await
        .unwrap();

        assert_eq!(snapshot.progress, Progress::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_returns_after_third_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let script = vec![
            Step::Progress("PENDING"),
            Step::Progress("PENDING"),
            Step::Progress("COMPLETED"),
        ];

        let snapshot = poll("doc", scripted(script, calls.clone()), &options(5_000))
            .await
            .unwrap();

        assert_eq!(snapshot.attempt, 3);
        assert_eq!(snapshot.progress, Progress::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unknown_progress_is_not_terminal() {
        let calls = Arc::new(AtomicUsize::new(0));
        let script = vec![Step::Progress("RECTIFYING"), Step::Progress("ERROR")];

        let outcome = poll_outcome("doc", scripted(script, calls.clone()), &options(5_000))
            .await
            .unwrap();

        match outcome {
            PollOutcome::Failed(snapshot) => assert_eq!(snapshot.attempt, 2),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remote_error_is_a_value_not_a_failure() {
        let calls = Arc::new(AtomicUsize::new(0));

        let result = poll(
            "doc",
            scripted(vec![Step::Progress("ERROR")], calls),
            &options(5_000),
        )
        .await;

        let snapshot = result.expect("ERROR is a terminal outcome, not a poll failure");
        assert_eq!(snapshot.progress, Progress::Error);
    }

    #[tokio::test]
    async fn test_times_out_never_before_deadline() {
        let calls = Arc::new(AtomicUsize::new(0));
        let started = Instant::now();

        let result = poll(
            "doc",
            scripted(vec![Step::Progress("PENDING")], calls.clone()),
            &options(150),
        )
        .await;

        assert!(started.elapsed() >= Duration::from_millis(150));
        match result {
            Err(PollError::TimeoutExceeded(d)) => assert_eq!(d, Duration::from_millis(150)),
            other => panic!("expected TimeoutExceeded, got {:?}", other),
        }

        // The worker is gone: no further fetches once poll has returned.
        let seen = calls.load(Ordering::SeqCst);
        assert!(seen > 0);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_busy_poll_still_times_out() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fetch = move |_reference: String| {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                Ok::<_, StubError>(Snapshot {
                    progress: Progress::Pending,
                    attempt: 0,
                })
            }
        };

        let outcome = poll_outcome("doc", fetch, &options(100)).await.unwrap();

        assert!(outcome.is_timed_out());
        assert!(calls.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_stops_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let script = vec![
            Step::Progress("PENDING"),
            Step::Fail("connection reset"),
            Step::Progress("COMPLETED"),
        ];
        let started = Instant::now();

        let result = poll("doc", scripted(script, calls.clone()), &options(5_000)).await;

        match result {
            Err(PollError::FetchFailed(e)) => assert_eq!(e, StubError("connection reset")),
            other => panic!("expected FetchFailed, got {:?}", other),
        }
        assert!(started.elapsed() < Duration::from_secs(2));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_spaces_out_fetches() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fetch = move |_reference: String| {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                Ok::<_, StubError>(Snapshot {
                    progress: Progress::Pending,
                    attempt: 0,
                })
            }
        };
        let opts = PollOptions::default()
            .with_timeout(Duration::from_millis(3_500))
            .with_interval(Duration::from_secs(1));

        let outcome = poll_outcome("doc", fetch, &opts).await.unwrap();

        assert_eq!(outcome, PollOutcome::TimedOut);
        // Fetches at t = 0s, 1s, 2s and 3s; the deadline fires at 3.5s.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_repeated_polls_are_independent() {
        let script = || vec![Step::Progress("PENDING"), Step::Progress("COMPLETED")];

        let first_calls = Arc::new(AtomicUsize::new(0));
        let first = poll("doc", scripted(script(), first_calls.clone()), &options(5_000))
            .await
            .unwrap();
        let second_calls = Arc::new(AtomicUsize::new(0));
        let second = poll("doc", scripted(script(), second_calls.clone()), &options(5_000))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first_calls.load(Ordering::SeqCst),
            second_calls.load(Ordering::SeqCst)
        );
    }
}
