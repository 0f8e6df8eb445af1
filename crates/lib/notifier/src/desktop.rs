//! Desktop notifications.

/// Action invoked when the notification body is clicked.
const DEFAULT_ACTION: &str = "default";

/// Desktop notification display options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopOptions {
    /// Application name shown with the notification.
    pub app_name: String,

    /// Icon name or path.
    pub icon: Option<String>,

    /// Keep the notification until it is dismissed.
    pub sticky: bool,

    /// Page opened when the notification is clicked.
    pub url: Option<String>,
}

/// Errors returned while showing a desktop notification.
#[derive(Debug, thiserror::Error)]
pub enum DesktopError {
    /// The notification server rejected the notification.
    #[error("show notification: {0}")]
    Show(#[source] notify_rust::error::Error),

    /// The blocking delivery task failed.
    #[error("notification task: {0}")]
    Join(#[source] tokio::task::JoinError),
}

/// Shows notifications through the platform notification service.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    /// Display options.
    options: DesktopOptions,
}

impl DesktopNotifier {
    /// Create a notifier with the given display options.
    pub fn new(options: DesktopOptions) -> Self {
        Self { options }
    }

    /// Build the platform notification.
    fn build(&self, title: &str, body: &str) -> notify_rust::Notification {
        let mut notification = notify_rust::Notification::new();
        notification
            .appname(&self.options.app_name)
            .summary(title)
            .body(body);

        if let Some(icon) = &self.options.icon {
            notification.icon(icon);
        }

        if self.options.sticky {
            notification.timeout(notify_rust::Timeout::Never);
        }

        if self.options.url.is_some() {
            notification.action(DEFAULT_ACTION, "Open mail");
        }

        #[cfg(all(unix, not(target_os = "macos")))]
        notification.urgency(if self.options.sticky {
            notify_rust::Urgency::Critical
        } else {
            notify_rust::Urgency::Normal
        });

        notification
    }
}

/// Show the notification and, if it links somewhere, open the link on click.
#[cfg(all(unix, not(target_os = "macos")))]
fn deliver(
    notification: notify_rust::Notification,
    url: Option<String>,
) -> Result<(), DesktopError> {
    let handle = notification.show().map_err(DesktopError::Show)?;

    if let Some(url) = url {
        // Blocks until the notification is closed, which for sticky ones may be never.
        std::thread::spawn(move || {
            handle.wait_for_action(|action| {
                if action == DEFAULT_ACTION {
                    open_url(&url);
                }
            });
        });
    }

    Ok(())
}

/// Show the notification; click actions are not reported on this platform.
#[cfg(not(all(unix, not(target_os = "macos"))))]
fn deliver(
    notification: notify_rust::Notification,
    _url: Option<String>,
) -> Result<(), DesktopError> {
    notification.show().map(drop).map_err(DesktopError::Show)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn open_url(url: &str) {
    tracing::debug!(url, "opening mail link");
    if let Err(error) = opener::open(url) {
        tracing::warn!(%error, url, "unable to open mail link");
    }
}

impl crate::Notifier for DesktopNotifier {
    type Error = DesktopError;

    async fn notify(&self, title: &str, body: &str) -> Result<(), Self::Error> {
        let notification = self.build(title, body);
        let url = self.options.url.clone();

        // Delivery talks to the session bus synchronously.
        tokio::task::spawn_blocking(move || deliver(notification, url))
            .await
            .map_err(DesktopError::Join)?
    }
}
