//! Bounded retry of throttled calls.
//!
//! A throttled call is retried after a fixed backoff until it succeeds, the
//! attempt ceiling is reached or the optional deadline would be crossed. The
//! retry counter lives on the stack of a single call, so concurrent calls never
//! see each other's counts.

use std::fmt;
use std::time::{Duration, Instant};

use keepalive_ddb_model::StoreOperation;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ErrorKind, classify};
use crate::transport::TransportError;

/// Time source and sleeper used by the retry loop.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current instant.
    fn now(&self) -> Instant;
    /// Blocks the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// How long to keep retrying a throttled call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Fixed pause between attempts.
    pub backoff: Duration,
    /// Maximum number of attempts, the first one included. Zero is treated as
    /// one.
    pub max_attempts: u32,
    /// Optional ceiling on the total time spent in one call.
    pub deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(1),
            max_attempts: 10,
            deadline: None,
        }
    }
}

/// A successful result and the number of throttle retries it took.
#[derive(Debug)]
pub(crate) struct Retried<T> {
    pub(crate) value: T,
    pub(crate) retries: u32,
}

/// Why the retry loop gave up.
#[derive(Debug)]
pub(crate) enum RetryFailure {
    /// Still throttled when the policy ran out.
    Exhausted { attempts: u32 },
    /// A non-throttling failure; never retried.
    Failed(TransportError),
}

/// Runs `call`, retrying throttled attempts according to `policy`.
pub(crate) fn with_retry<T>(
    policy: &RetryPolicy,
    clock: &dyn Clock,
    operation: StoreOperation,
    table: &str,
    mut call: impl FnMut() -> Result<T, TransportError>,
) -> Result<Retried<T>, RetryFailure> {
    let started = clock.now();
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match call() {
            Ok(value) => {
                return Ok(Retried {
                    value,
                    retries: attempt - 1,
                });
            }
            Err(error) => error,
        };

        let throttled = error
            .as_service()
            .is_some_and(|e| classify(&e.code) == ErrorKind::Throttling);
        if !throttled {
            return Err(RetryFailure::Failed(error));
        }

        let out_of_time = policy
            .deadline
            .is_some_and(|deadline| clock.now() + policy.backoff - started > deadline);
        if attempt >= max_attempts || out_of_time {
            warn!(
                %operation,
                table,
                attempts = attempt,
                "giving up on throttled request"
            );
            return Err(RetryFailure::Exhausted { attempts: attempt });
        }

        warn!(
            %operation,
            table,
            attempt,
            backoff_ms = u64::try_from(policy.backoff.as_millis()).unwrap_or(u64::MAX),
            "request throttled, backing off"
        );
        clock.sleep(policy.backoff);
        attempt += 1;
    }
}
