//! Turns platform power events into internal pause/resume signals.

use std::time::Duration;

use futures::StreamExt as _;
use futures::stream::BoxStream;

#[cfg(all(target_os = "linux", feature = "logind"))]
mod logind;

#[cfg(all(target_os = "linux", feature = "logind"))]
pub use self::logind::*;

/// Delay after a system resume before polling restarts, letting the
/// network come back up.
pub const RESUME_SETTLE_DELAY: Duration = Duration::from_secs(10);

/// How long to wait for the watcher task when stopping it.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// A platform power state change.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PowerEvent {
    /// The system is about to suspend.
    Suspending,

    /// The system has resumed from suspend.
    Resumed,
}

/// A source of platform power events.
pub trait PowerEvents: Send + Sync + 'static {
    /// Subscribe to power events.
    fn subscribe(&self) -> BoxStream<'static, PowerEvent>;
}

/// A running watcher.
#[derive(Debug)]
pub struct Watcher {
    /// Stops the watcher loop.
    stop: tokio_util::sync::CancellationToken,

    /// The watcher task.
    task: tokio::task::JoinHandle<()>,
}

impl Watcher {
    /// Start forwarding power events from the source as control signals.
    pub fn spawn(
        source: &dyn PowerEvents,
        control: control_core::ControlHandle,
        settle_delay: Duration,
    ) -> Self {
        let stop = tokio_util::sync::CancellationToken::new();
        let events = source.subscribe();
        let task = tokio::spawn(forward(events, control, settle_delay, stop.clone()));
        Self { stop, task }
    }

    /// Stop the watcher and wait briefly for it to finish.
    pub async fn stop(self) {
        self.stop.cancel();
        if tokio::time::timeout(STOP_TIMEOUT, self.task).await.is_err() {
            tracing::warn!("suspend watcher did not stop in time");
        }
    }
}

/// Forward power events until stopped or the stream ends.
async fn forward(
    mut events: BoxStream<'static, PowerEvent>,
    control: control_core::ControlHandle,
    settle_delay: Duration,
    stop: tokio_util::sync::CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = stop.cancelled() => break,
            event = events.next() => event,
        };

        match event {
            None => {
                tracing::debug!("power event stream ended");
                break;
            }
            Some(PowerEvent::Suspending) => {
                tracing::info!("system is suspending, pausing");
                control.pause(control_core::Origin::Internal);
            }
            Some(PowerEvent::Resumed) => {
                tracing::info!(delay = ?settle_delay, "system resumed, resuming after a delay");
                tokio::select! {
                    _ = stop.cancelled() => break,
                    () = tokio::time::sleep(settle_delay) => {
                        control.resume(control_core::Origin::Internal);
                    }
                }
            }
        }
    }
}
