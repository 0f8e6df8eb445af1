//! Control-plane signals consumed by the event loop.

use tokio::sync::mpsc;

/// Where a pause or resume request came from.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Origin {
    /// Requested from outside the process, e.g. by the user.
    ///
    /// Acts on the suspend watcher too.
    External,

    /// Raised by the process itself, e.g. by the suspend watcher.
    Internal,
}

/// A control signal.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Signal {
    /// Stop polling until resumed.
    Pause(Origin),

    /// Resume polling.
    Resume(Origin),

    /// Stop everything and exit cleanly.
    Cancel,

    /// A single-shot run has completed.
    Finished,

    /// Polling failed unrecoverably.
    Fail(String),
}

/// A cloneable handle for enqueueing control signals.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    /// The signal queue.
    tx: mpsc::UnboundedSender<Signal>,
}

impl ControlHandle {
    /// Create a handle and the receiving end of its queue.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Signal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueue a signal.
    ///
    /// Returns `false` when the event loop is gone.
    pub fn send(&self, signal: Signal) -> bool {
        match self.tx.send(signal) {
            Ok(()) => true,
            Err(mpsc::error::SendError(signal)) => {
                tracing::debug!(?signal, "event loop is gone, dropping signal");
                false
            }
        }
    }

    /// Request a pause.
    pub fn pause(&self, origin: Origin) -> bool {
        self.send(Signal::Pause(origin))
    }

    /// Request a resume.
    pub fn resume(&self, origin: Origin) -> bool {
        self.send(Signal::Resume(origin))
    }

    /// Request an orderly shutdown.
    pub fn cancel(&self) -> bool {
        self.send(Signal::Cancel)
    }

    /// Report an unrecoverable failure.
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.send(Signal::Fail(reason.into()))
    }
}
