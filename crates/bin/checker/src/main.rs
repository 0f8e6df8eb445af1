//! Main entrypoint.

use clap::Parser as _;
use color_eyre::eyre::{WrapErr as _, eyre};
use control_core::ControlHandle;
use event_loop::{EventLoop, Termination};
use poll_scheduler::{Scheduler, SchedulerContext};
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;

    let args = cli::Args::parse();
    init_tracing(args.verbose);

    let config = config_load::with_default_env_var(args.settings.clone())
        .await
        .wrap_err("unable to load settings")?;
    tracing::debug!(path = %config.path.display(), "using settings file");

    let account = config_bringup::resolve(&config.payload, args.overrides())
        .wrap_err_with(|| format!("invalid settings in {}", config.path.display()))?;

    tracing::info!(
        profile = %account.profile,
        host = %account.host,
        port = account.port,
        user = %account.username,
        period = ?account.period,
        "starting mail checker",
    );

    let notifier = backend::Backend::new(&account.notification);
    let (control, signals) = ControlHandle::channel();
    let context = SchedulerContext::new(account.exclusions.clone(), account.period.as_duration());
    let scheduler = Scheduler::new(context, account.connector(), notifier, control.clone());
    let scheduler = watch_power_events(scheduler).await;
    let mut event_loop = EventLoop::new(scheduler, signals);

    tokio::spawn(cancel_on_interrupt(control));

    match event_loop.run().await {
        Termination::Cancelled | Termination::Finished => Ok(()),
        Termination::Failed(reason) => Err(eyre!("mail check failed: {reason}")),
    }
}

/// Log to stderr; `RUST_LOG` wins over the verbosity flag.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Pause polling while the system sleeps.
#[cfg(target_os = "linux")]
async fn watch_power_events<C, N>(scheduler: Scheduler<C, N>) -> Scheduler<C, N>
where
    C: transport_core::Connector,
    N: notifier::Notifier,
{
    match suspend_watcher::LogindPower::connect().await {
        Ok(source) => scheduler.with_power_events(std::sync::Arc::new(source)),
        Err(error) => {
            tracing::warn!(%error, "suspend detection unavailable");
            scheduler
        }
    }
}

/// No power event source on this platform.
#[cfg(not(target_os = "linux"))]
async fn watch_power_events<C, N>(scheduler: Scheduler<C, N>) -> Scheduler<C, N> {
    scheduler
}

/// Ask the event loop to shut down on Ctrl-C.
async fn cancel_on_interrupt(control: ControlHandle) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("interrupted, shutting down");
            control.cancel();
        }
        Err(error) => {
            tracing::warn!(%error, "unable to listen for Ctrl-C");
        }
    }
}
