//! The background task that runs poll cycles.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use control_core::{ControlHandle, Signal};
use notifier::Notifier;
use poll_cycle::CycleOutcome;
use supervisor::{Outcome, SupervisorEvent};
use tokio_util::sync::CancellationToken;
use transport_core::{Connector, Session as _, TransportError};

use crate::SchedulerContext;

/// How long to wait for the worker to observe cancellation.
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// A running worker task.
#[derive(Debug)]
pub(crate) struct Worker {
    /// Cancels the current run.
    token: CancellationToken,

    /// The worker task.
    handle: tokio::task::JoinHandle<()>,
}

impl Worker {
    /// Spawn a worker with a fresh cancellation token.
    pub(crate) fn spawn<C, N>(
        context: SchedulerContext,
        connector: Arc<C>,
        notifier: Arc<N>,
        control: ControlHandle,
    ) -> Self
    where
        C: Connector,
        N: Notifier,
    {
        let token = CancellationToken::new();
        let handle = tokio::spawn(work_loop(
            context,
            connector,
            notifier,
            control,
            token.clone(),
        ));
        Self { token, handle }
    }

    /// Cancel the run and wait for the task within `JOIN_TIMEOUT`.
    ///
    /// On timeout the task is left to finish on its own.
    pub(crate) async fn stop(self) {
        self.token.cancel();
        match tokio::time::timeout(JOIN_TIMEOUT, self.handle).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => tracing::error!(%error, "poll worker panicked"),
            Err(_) => tracing::warn!(timeout = ?JOIN_TIMEOUT, "poll worker did not stop in time"),
        }
    }
}

/// Sleep unless cancelled first.
async fn sleep(token: &CancellationToken, duration: Duration) -> ControlFlow<()> {
    tokio::select! {
        () = token.cancelled() => ControlFlow::Break(()),
        () = tokio::time::sleep(duration) => ControlFlow::Continue(()),
    }
}

fn log_event(event: SupervisorEvent<'_, TransportError>) {
    match event {
        SupervisorEvent::Started { attempt } => {
            tracing::debug!(attempt, "starting poll cycle");
        }
        SupervisorEvent::Retrying {
            error,
            attempt,
            next_retry_in,
        } => {
            tracing::warn!(%error, attempt, ?next_retry_in, "poll cycle failed, retrying");
        }
        SupervisorEvent::GaveUp { error, attempts } => {
            tracing::error!(%error, attempts, "poll cycle failed, giving up");
        }
    }
}

/// Connect, run one cycle and log out.
async fn attempt<C, N>(
    context: &SchedulerContext,
    connector: &C,
    notifier: &N,
    token: &CancellationToken,
) -> Result<CycleOutcome, TransportError>
where
    C: Connector,
    N: Notifier,
{
    let mut session = connector.connect().await?;

    let outcome = {
        let mut tracker = context.tracker.lock().await;
        poll_cycle::run(poll_cycle::Params {
            session: &mut session,
            tracker: &mut *tracker,
            exclusions: &context.exclusions,
            notifier,
            cancel: token,
        })
        .await
    };

    if let Err(error) = session.logout().await {
        tracing::debug!(%error, "logout failed");
    }

    outcome
}

async fn work_loop<C, N>(
    context: SchedulerContext,
    connector: Arc<C>,
    notifier: Arc<N>,
    control: ControlHandle,
    token: CancellationToken,
) where
    C: Connector,
    N: Notifier,
{
    let context = &context;
    let connector = &*connector;
    let notifier = &*notifier;
    let token = &token;

    loop {
        let outcome = supervisor::run(supervisor::Params {
            work: move || attempt(context, connector, notifier, token),
            is_retryable: TransportError::is_transient,
            observer: log_event,
            sleep: move |delay| sleep(token, delay),
            policy: context.retry,
        })
        .await;

        match outcome {
            Outcome::Done(CycleOutcome::Completed(report)) => {
                tracing::info!(
                    mailboxes = report.mailboxes_scanned,
                    messages = report.messages_notified,
                    "poll cycle completed"
                );

                let Some(period) = context.period else {
                    control.send(Signal::Finished);
                    return;
                };

                if sleep(token, period).await.is_break() {
                    return;
                }
            }
            Outcome::Done(CycleOutcome::CancelledMidway) => {
                tracing::info!("poll cycle cancelled");
                return;
            }
            Outcome::Interrupted => {
                tracing::info!("retry interrupted");
                return;
            }
            Outcome::Failed(error) if token.is_cancelled() => {
                tracing::info!(%error, "poll cycle failed after being stopped");
                return;
            }
            Outcome::Failed(error) => {
                control.fail(error.to_string());
                return;
            }
        }
    }
}
