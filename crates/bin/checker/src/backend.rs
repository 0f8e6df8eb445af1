//! The notifier selected by configuration.

use config_core::NotificationBackend;
use notifier::{DesktopNotifier, DesktopOptions, LogNotifier, Notifier};

/// Either of the bundled notifiers.
#[derive(Debug)]
pub enum Backend {
    /// Log lines only.
    Log(LogNotifier),

    /// Desktop notifications.
    Desktop(DesktopNotifier),
}

/// Notification delivery error.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The desktop notification failed.
    #[error(transparent)]
    Desktop(#[from] notifier::DesktopError),
}

impl Backend {
    /// Build the configured notifier.
    pub fn new(options: &config_bringup::NotificationOptions) -> Self {
        match options.backend {
            NotificationBackend::Log => Self::Log(LogNotifier),
            NotificationBackend::Desktop => Self::Desktop(DesktopNotifier::new(DesktopOptions {
                app_name: options.app_name.clone(),
                icon: options.icon.clone(),
                sticky: options.sticky,
                url: options.url.clone(),
            })),
        }
    }
}

impl Notifier for Backend {
    type Error = BackendError;

    async fn notify(&self, title: &str, body: &str) -> Result<(), Self::Error> {
        match self {
            Self::Log(log) => log.notify(title, body).await.map_err(|never| match never {}),
            Self::Desktop(desktop) => Ok(desktop.notify(title, body).await?),
        }
    }
}
