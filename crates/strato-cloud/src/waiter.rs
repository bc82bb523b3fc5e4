//! Generic wait-for-state polling
//!
//! Asynchronous provisioning calls (cluster creation, volume creation) only
//! return a handle; completion is observed by polling a status endpoint until
//! the resource reports a terminal state. This module provides the one poll
//! loop shared by every resource: repeatedly invoke a status check until it
//! reports a target state, an unexpected state, or the timeout elapses.

use crate::error::{CloudError, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Describes one wait: which state labels finish it, which keep it going,
/// and how long/often to poll.
///
/// Target and pending labels must be disjoint. A polled label found in
/// neither set means the operation failed or entered a state this wait was
/// not written for, and aborts the wait immediately.
#[derive(Debug, Clone)]
pub struct WaitSpec {
    /// Terminal labels that complete the wait successfully
    pub target: Vec<String>,

    /// Labels that mean "not done yet, keep polling"
    pub pending: Vec<String>,

    /// Overall wall-clock budget for the wait
    pub timeout: Duration,

    /// Sleep between consecutive polls
    pub interval: Duration,
}

impl WaitSpec {
    pub fn new<S: Into<String>>(
        target: impl IntoIterator<Item = S>,
        pending: impl IntoIterator<Item = S>,
        timeout: Duration,
        interval: Duration,
    ) -> Self {
        Self {
            target: target.into_iter().map(Into::into).collect(),
            pending: pending.into_iter().map(Into::into).collect(),
            timeout,
            interval,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.target.is_empty() {
            return Err(CloudError::InvalidConfig(
                "wait spec has no target states".to_string(),
            ));
        }
        if self.timeout.is_zero() || self.interval.is_zero() {
            return Err(CloudError::InvalidConfig(
                "wait timeout and interval must be non-zero".to_string(),
            ));
        }
        if let Some(label) = self.target.iter().find(|t| self.pending.contains(t)) {
            return Err(CloudError::InvalidConfig(format!(
                "state {label:?} is both a target and a pending state"
            )));
        }
        Ok(())
    }
}

/// Poll until a target state is reached.
///
/// `poll` performs one status read and maps the response to a payload plus a
/// state label. A failed poll (network hiccup, undecodable body) is treated
/// as "state unknown": it is logged and retried on the next interval rather
/// than aborting the wait. The wait ends in exactly one of three ways:
///
/// - `Ok(payload)` — the reported label is in `spec.target`
/// - [`CloudError::UnexpectedState`] — the label is in neither set
/// - [`CloudError::WaitTimeout`] — `spec.timeout` elapsed first
///
/// The first poll happens immediately; a target label on the first attempt
/// returns without sleeping. No poll is issued after a terminal result.
pub async fn wait_for_state<T, E, F, Fut>(spec: &WaitSpec, mut poll: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<(T, String), E>>,
    E: std::fmt::Display,
{
    spec.validate()?;

    let start = Instant::now();
    loop {
        match poll().await {
            Ok((payload, state)) => {
                if spec.target.iter().any(|t| *t == state) {
                    return Ok(payload);
                }
                if !spec.pending.iter().any(|p| *p == state) {
                    return Err(CloudError::UnexpectedState(state));
                }
                tracing::debug!("still waiting, state is {state:?}");
            }
            Err(e) => {
                // Transient: network errors during polling should not fail
                // the whole wait. The timeout bounds the retries.
                tracing::debug!("poll attempt failed, will retry: {e}");
            }
        }

        if start.elapsed() >= spec.timeout {
            return Err(CloudError::WaitTimeout(spec.timeout));
        }
        sleep(spec.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn spec(timeout_ms: u64, interval_ms: u64) -> WaitSpec {
        WaitSpec::new(
            ["Done"],
            ["Pending"],
            Duration::from_millis(timeout_ms),
            Duration::from_millis(interval_ms),
        )
    }

    /// Drives the waiter through a fixed sequence of poll outcomes.
    struct Script {
        states: Vec<std::result::Result<&'static str, &'static str>>,
        calls: AtomicUsize,
    }

    impl Script {
        fn new(states: Vec<std::result::Result<&'static str, &'static str>>) -> Self {
            Self {
                states,
                calls: AtomicUsize::new(0),
            }
        }

        fn next(&self) -> std::result::Result<(u32, String), String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.states.get(n).copied().unwrap_or(Ok("Pending"));
            match step {
                Ok(label) => Ok((n as u32, label.to_string())),
                Err(e) => Err(e.to_string()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn immediate_target_returns_without_sleeping() {
        let script = Script::new(vec![Ok("Done")]);
        let started = Instant::now();
        let payload = wait_for_state(&spec(1_000, 500), || async { script.next() })
            .await
            .unwrap();
        assert_eq!(payload, 0);
        assert_eq!(script.calls(), 1);
        // No interval sleep may have happened on the fast path.
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn pending_then_done() {
        let script = Script::new(vec![Ok("Pending"), Ok("Pending"), Ok("Done")]);
        let payload = wait_for_state(&spec(2_000, 10), || async { script.next() })
            .await
            .unwrap();
        assert_eq!(payload, 2);
        assert_eq!(script.calls(), 3);
    }

    #[tokio::test]
    async fn always_pending_times_out() {
        let script = Script::new(vec![]);
        let err = wait_for_state(&spec(100, 20), || async { script.next() })
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::WaitTimeout(_)));
        // At least floor(timeout / interval) polls before giving up.
        assert!(script.calls() >= 5, "polled {} times", script.calls());
    }

    #[tokio::test]
    async fn unexpected_state_aborts_immediately() {
        let script = Script::new(vec![Ok("Pending"), Ok("Error"), Ok("Done")]);
        let err = wait_for_state(&spec(5_000, 10), || async { script.next() })
            .await
            .unwrap_err();
        match err {
            CloudError::UnexpectedState(s) => assert_eq!(s, "Error"),
            other => panic!("expected UnexpectedState, got {other}"),
        }
        // The third (target) step must never have been polled.
        assert_eq!(script.calls(), 2);
    }

    #[tokio::test]
    async fn transient_errors_do_not_abort() {
        let script = Script::new(vec![Err("connection reset"), Err("503"), Ok("Done")]);
        let payload = wait_for_state(&spec(2_000, 10), || async { script.next() })
            .await
            .unwrap();
        assert_eq!(payload, 2);
    }

    #[tokio::test]
    async fn persistent_errors_end_in_timeout() {
        let calls = AtomicUsize::new(0);
        let err = wait_for_state(&spec(80, 20), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(u32, String), _>("no route to host") }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CloudError::WaitTimeout(_)));
        assert!(calls.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn deterministic_polls_yield_the_same_outcome_twice() {
        for _ in 0..2 {
            let script = Script::new(vec![Ok("Pending"), Ok("Done")]);
            let payload = wait_for_state(&spec(1_000, 10), || async { script.next() })
                .await
                .unwrap();
            assert_eq!(payload, 1);
        }
    }

    #[tokio::test]
    async fn empty_target_set_is_rejected() {
        let bad = WaitSpec::new(
            Vec::<String>::new(),
            vec!["Pending".to_string()],
            Duration::from_secs(1),
            Duration::from_millis(10),
        );
        let polled = AtomicUsize::new(0);
        let err = wait_for_state(&bad, || {
            polled.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(((), "Pending".to_string())) }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CloudError::InvalidConfig(_)));
        assert_eq!(polled.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn overlapping_label_sets_are_rejected() {
        let bad = spec(1_000, 10);
        let bad = WaitSpec {
            pending: bad.target.clone(),
            ..bad
        };
        let err = wait_for_state(&bad, || async { Ok::<_, String>(((), "Done".to_string())) })
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::InvalidConfig(_)));
    }
}
