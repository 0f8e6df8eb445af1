//! Periodic poll scheduling with cooperative pause, resume and cancel.
//!
//! The scheduler owns at most one worker task. Only the event loop drives
//! its transitions; the worker reports back through control signals.

use std::sync::Arc;
use std::time::Duration;

use control_core::ControlHandle;
use notifier::Notifier;
use suspend_watcher::{PowerEvents, RESUME_SETTLE_DELAY, Watcher};
use transport_core::Connector;

mod context;
mod state;
mod worker;

pub use self::context::*;
pub use self::state::*;
pub use self::worker::JOIN_TIMEOUT;

use self::worker::Worker;

/// Runs poll cycles on a background worker.
pub struct Scheduler<C, N> {
    /// Shared polling state.
    context: SchedulerContext,

    /// Opens transport sessions.
    connector: Arc<C>,

    /// Receives new message notifications.
    notifier: Arc<N>,

    /// Where the worker reports completion and failure.
    control: ControlHandle,

    /// Optional platform power event source.
    power_events: Option<Arc<dyn PowerEvents>>,

    /// Current lifecycle state.
    state: SchedulerState,

    /// The active worker, if any.
    worker: Option<Worker>,

    /// The active suspend watcher, if any.
    watcher: Option<Watcher>,
}

impl<C, N> Scheduler<C, N>
where
    C: Connector,
    N: Notifier,
{
    /// Create an idle scheduler.
    pub fn new(context: SchedulerContext, connector: C, notifier: N, control: ControlHandle) -> Self {
        Self {
            context,
            connector: Arc::new(connector),
            notifier: Arc::new(notifier),
            control,
            power_events: None,
            state: SchedulerState::Idle,
            worker: None,
            watcher: None,
        }
    }

    /// Pause and resume around system suspend using the given source.
    #[must_use]
    pub fn with_power_events(mut self, source: Arc<dyn PowerEvents>) -> Self {
        self.power_events = Some(source);
        self
    }

    /// The current state.
    pub const fn state(&self) -> &SchedulerState {
        &self.state
    }

    /// The configured delay between cycles.
    pub const fn period(&self) -> Option<Duration> {
        self.context.period
    }

    /// The shared polling state.
    pub const fn context(&self) -> &SchedulerContext {
        &self.context
    }

    /// Start polling.
    pub fn start(&mut self) {
        if self.state != SchedulerState::Idle {
            tracing::warn!(state = ?self.state, "scheduler already started");
            return;
        }

        tracing::info!(period = ?self.context.period, "starting scheduler");
        self.spawn_worker();
        self.spawn_watcher();
        self.state = SchedulerState::Running;
    }

    /// Pause polling, cancelling the in-flight cycle.
    ///
    /// A full pause also stops the suspend watcher.
    pub async fn request_pause(&mut self, full: bool) {
        match self.state {
            SchedulerState::Running => {
                tracing::info!(full, "pausing");
                self.stop_worker().await;
                self.state = SchedulerState::Paused;
            }
            SchedulerState::Paused => {
                tracing::debug!(full, "already paused");
            }
            ref state => {
                tracing::debug!(?state, "ignoring pause");
                return;
            }
        }

        if full {
            self.stop_watcher().await;
        }
    }

    /// Resume polling after a pause.
    ///
    /// A no-op when periodic polling is disabled. A full resume also
    /// restarts the suspend watcher.
    pub fn request_resume(&mut self, full: bool) {
        if self.context.period.is_none() {
            tracing::debug!("periodic polling is disabled, ignoring resume");
            return;
        }

        match self.state {
            SchedulerState::Paused => {
                tracing::info!(full, "resuming");
                self.spawn_worker();
                self.state = SchedulerState::Running;
            }
            SchedulerState::Running => {
                tracing::debug!(full, "already running");
            }
            ref state => {
                tracing::debug!(?state, "ignoring resume");
                return;
            }
        }

        if full {
            self.spawn_watcher();
        }
    }

    /// Stop polling for good.
    pub async fn request_cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }

        tracing::info!("cancelling scheduler");
        self.shutdown().await;
        self.state = SchedulerState::Cancelled;
    }

    /// Stop polling after an unrecoverable failure.
    pub async fn fail(&mut self, reason: String) {
        if self.state.is_terminal() {
            return;
        }

        tracing::error!(%reason, "scheduler failed");
        self.shutdown().await;
        self.state = SchedulerState::Failed(reason);
    }

    async fn shutdown(&mut self) {
        self.stop_worker().await;
        self.stop_watcher().await;
    }

    fn spawn_worker(&mut self) {
        self.worker = Some(Worker::spawn(
            self.context.clone(),
            Arc::clone(&self.connector),
            Arc::clone(&self.notifier),
            self.control.clone(),
        ));
    }

    async fn stop_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop().await;
        }
    }

    fn spawn_watcher(&mut self) {
        if self.watcher.is_some() {
            return;
        }
        if let Some(source) = &self.power_events {
            self.watcher = Some(Watcher::spawn(
                source.as_ref(),
                self.control.clone(),
                RESUME_SETTLE_DELAY,
            ));
        }
    }

    async fn stop_watcher(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.stop().await;
        }
    }
}
