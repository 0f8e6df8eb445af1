//! A notifier that records what it was asked to show.

use std::sync::{Arc, Mutex};

/// Error returned by a failing `RecordingNotifier`.
#[derive(Debug, thiserror::Error)]
#[error("notification backend unavailable")]
pub struct NotifyError;

/// Records every notification, optionally failing each delivery.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    seen: Arc<Mutex<Vec<(String, String)>>>,
    failing: bool,
}

impl RecordingNotifier {
    /// A notifier that accepts every notification.
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier that records, then fails, every notification.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// The `(title, body)` pairs delivered so far.
    pub fn notifications(&self) -> Vec<(String, String)> {
        self.seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl notifier::Notifier for RecordingNotifier {
    type Error = NotifyError;

    async fn notify(&self, title: &str, body: &str) -> Result<(), Self::Error> {
        self.seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((title.to_owned(), body.to_owned()));

        if self.failing {
            return Err(NotifyError);
        }
        Ok(())
    }
}
