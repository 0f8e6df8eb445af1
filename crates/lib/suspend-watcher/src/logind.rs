//! Power events from systemd-logind.

use futures::StreamExt as _;
use futures::stream::BoxStream;

use crate::{PowerEvent, PowerEvents};

#[zbus::proxy(
    interface = "org.freedesktop.login1.Manager",
    default_service = "org.freedesktop.login1",
    default_path = "/org/freedesktop/login1"
)]
trait Manager {
    /// Emitted with `true` before the system sleeps and `false` after it wakes.
    #[zbus(signal)]
    fn prepare_for_sleep(&self, start: bool) -> zbus::Result<()>;
}

/// Maps a `PrepareForSleep` argument to a power event.
const fn power_event(start: bool) -> PowerEvent {
    if start {
        PowerEvent::Suspending
    } else {
        PowerEvent::Resumed
    }
}

/// Suspend and resume notifications from the logind manager on the system bus.
#[derive(Debug, Clone)]
pub struct LogindPower {
    manager: ManagerProxy<'static>,
}

impl LogindPower {
    /// Connect to the system bus.
    pub async fn connect() -> zbus::Result<Self> {
        let connection = zbus::Connection::system().await?;
        let manager = ManagerProxy::new(&connection).await?;
        Ok(Self { manager })
    }
}

impl PowerEvents for LogindPower {
    fn subscribe(&self) -> BoxStream<'static, PowerEvent> {
        let manager = self.manager.clone();

        futures::stream::once(async move { manager.receive_prepare_for_sleep().await })
            .flat_map(|signals| match signals {
                Ok(signals) => signals
                    .filter_map(|signal| async move {
                        match signal.args() {
                            Ok(args) => Some(power_event(*args.start())),
                            Err(error) => {
                                tracing::warn!(%error, "malformed PrepareForSleep signal");
                                None
                            }
                        }
                    })
                    .left_stream(),
                Err(error) => {
                    tracing::warn!(%error, "unable to subscribe to logind sleep signals");
                    futures::stream::empty().right_stream()
                }
            })
            .boxed()
    }
}
