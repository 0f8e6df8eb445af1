//! Notification delivery for new messages.

use std::future::Future;

#[cfg(feature = "desktop")]
mod desktop;

#[cfg(feature = "desktop")]
pub use desktop::*;

/// A notification sink.
pub trait Notifier: Send + Sync + 'static {
    /// Delivery error.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deliver a single notification.
    fn notify(
        &self,
        title: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    type Error = core::convert::Infallible;

    async fn notify(&self, title: &str, body: &str) -> Result<(), Self::Error> {
        tracing::info!(%title, %body, "new email");
        Ok(())
    }
}
