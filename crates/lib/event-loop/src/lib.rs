//! The single consumer of control signals.
//!
//! Every scheduler transition happens here, one signal at a time.

use control_core::{Origin, Signal};
use notifier::Notifier;
use poll_scheduler::Scheduler;
use tokio::sync::mpsc::UnboundedReceiver;
use transport_core::Connector;

/// Why the event loop stopped.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Termination {
    /// Shut down on request.
    Cancelled,

    /// A single-shot run completed.
    Finished,

    /// Polling failed unrecoverably.
    Failed(String),
}

impl Termination {
    /// Whether the process should exit successfully.
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Drives a scheduler from a queue of control signals.
pub struct EventLoop<C, N> {
    /// The scheduler being driven.
    scheduler: Scheduler<C, N>,

    /// Incoming signals.
    signals: UnboundedReceiver<Signal>,
}

impl<C, N> EventLoop<C, N>
where
    C: Connector,
    N: Notifier,
{
    /// Create an event loop over the scheduler and the receiving end of its
    /// control queue.
    pub const fn new(scheduler: Scheduler<C, N>, signals: UnboundedReceiver<Signal>) -> Self {
        Self { scheduler, signals }
    }

    /// The driven scheduler.
    pub const fn scheduler(&self) -> &Scheduler<C, N> {
        &self.scheduler
    }

    /// Start the scheduler and handle signals until a terminating one.
    pub async fn run(&mut self) -> Termination {
        self.scheduler.start();

        while let Some(signal) = self.signals.recv().await {
            tracing::debug!(?signal, "handling control signal");

            if let Some(termination) = self.handle(signal).await {
                tracing::info!(?termination, "event loop terminated");
                return termination;
            }
        }

        tracing::debug!("control queue closed");
        self.scheduler.request_cancel().await;
        Termination::Cancelled
    }

    async fn handle(&mut self, signal: Signal) -> Option<Termination> {
        match signal {
            Signal::Pause(origin) => {
                self.scheduler
                    .request_pause(origin == Origin::External)
                    .await;
            }
            Signal::Resume(origin) => {
                if self.scheduler.period().is_none() {
                    tracing::debug!("periodic polling is disabled, ignoring resume");
                    return None;
                }
                self.scheduler.request_resume(origin == Origin::External);
            }
            Signal::Cancel => {
                self.scheduler.request_cancel().await;
                return Some(Termination::Cancelled);
            }
            Signal::Finished => {
                self.scheduler.request_cancel().await;
                return Some(Termination::Finished);
            }
            Signal::Fail(reason) => {
                self.scheduler.fail(reason.clone()).await;
                return Some(Termination::Failed(reason));
            }
        }
        None
    }
}
