//! Bounded retry harness for supervised async work.

#![cfg_attr(not(test), no_std)]

use core::future::Future;
use core::ops::ControlFlow;
use core::time::Duration;

/// How often and how long to wait before retrying failed work.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt.
    pub retries: u32,

    /// Fixed delay before each retry.
    pub delay: Duration,
}

/// Event sent to the observer.
#[derive(Debug)]
pub enum SupervisorEvent<'a, E> {
    /// An attempt is about to be invoked.
    Started {
        /// One-based attempt number.
        attempt: u32,
    },

    /// The attempt failed and will be retried.
    Retrying {
        /// The error that was returned by the work future.
        error: &'a E,

        /// The attempt that failed.
        attempt: u32,

        /// The time to wait before the next attempt.
        next_retry_in: Duration,
    },

    /// The attempt failed and no retry follows.
    GaveUp {
        /// The error that was returned by the work future.
        error: &'a E,

        /// Total number of attempts made.
        attempts: u32,
    },
}

/// Final result of a supervised run.
#[derive(Debug, Eq, PartialEq)]
pub enum Outcome<T, E> {
    /// The work completed.
    Done(T),

    /// The work failed and was not retried further.
    Failed(E),

    /// The sleep before a retry was interrupted.
    Interrupted,
}

/// Parameters for `run`. Generic over the work, classifier, observer and
/// sleep closures.
pub struct Params<Work, Retryable, Observer, Sleep> {
    /// The work to run.
    pub work: Work,

    /// Decides whether an error is worth retrying.
    pub is_retryable: Retryable,

    /// Observer for events.
    pub observer: Observer,

    /// Sleep timer. Returning `Break` abandons the pending retry.
    pub sleep: Sleep,

    /// The retry configuration.
    pub policy: RetryPolicy,
}

/// Run the work, retrying retryable failures as the policy allows.
pub async fn run<Work, WorkFut, Retryable, Observer, Sleep, SleepFut, Value, Error>(
    mut params: Params<Work, Retryable, Observer, Sleep>,
) -> Outcome<Value, Error>
where
    Work: FnMut() -> WorkFut,
    WorkFut: Future<Output = Result<Value, Error>>,
    Retryable: Fn(&Error) -> bool,
    Observer: FnMut(SupervisorEvent<'_, Error>),
    Sleep: FnMut(Duration) -> SleepFut,
    SleepFut: Future<Output = ControlFlow<()>>,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        (params.observer)(SupervisorEvent::Started { attempt });

        let error = match (params.work)().await {
            Ok(value) => return Outcome::Done(value),
            Err(error) => error,
        };

        let retries_left = params.policy.retries.saturating_sub(attempt - 1);
        if retries_left == 0 || !(params.is_retryable)(&error) {
            (params.observer)(SupervisorEvent::GaveUp {
                error: &error,
                attempts: attempt,
            });
            return Outcome::Failed(error);
        }

        (params.observer)(SupervisorEvent::Retrying {
            error: &error,
            attempt,
            next_retry_in: params.policy.delay,
        });

        if (params.sleep)(params.policy.delay).await.is_break() {
            return Outcome::Interrupted;
        }
    }
}
