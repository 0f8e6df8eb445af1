//! Lift raw config into a resolved account.

use std::time::Duration;

use mailbox_filter::Exclusions;

mod error;

pub use self::error::*;

/// Command line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Profile to use instead of the configured default.
    pub profile: Option<String>,

    /// User to log in as.
    pub username: Option<String>,

    /// Password to log in with.
    pub password: Option<String>,
}

/// Polling period.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Period {
    /// Poll repeatedly with this delay between cycles.
    Every(Duration),

    /// Run a single cycle.
    Disabled,
}

impl Period {
    /// The delay between cycles, if polling is periodic.
    pub const fn as_duration(self) -> Option<Duration> {
        match self {
            Self::Every(duration) => Some(duration),
            Self::Disabled => None,
        }
    }
}

/// Resolved notification settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOptions {
    /// Notification backend.
    pub backend: config_core::NotificationBackend,

    /// Application name shown with notifications.
    pub app_name: String,

    /// Icon name or path.
    pub icon: Option<String>,

    /// Keep notifications on screen until dismissed.
    pub sticky: bool,

    /// Page opened when a notification is clicked.
    pub url: Option<String>,
}

/// A fully resolved account.
#[derive(Debug, Clone)]
pub struct Account {
    /// The profile the account came from.
    pub profile: String,

    /// Hostname or IP address of the IMAP server.
    pub host: String,

    /// IMAP port.
    pub port: u16,

    /// TLS mode.
    pub tls_mode: imap_transport::TlsMode,

    /// TLS server name (SNI).
    pub tls_server_name: String,

    /// Username for IMAP authentication.
    pub username: String,

    /// Password for IMAP authentication.
    pub password: imap_transport::Password,

    /// Polling period.
    pub period: Period,

    /// Mailboxes to skip.
    pub exclusions: Exclusions,

    /// Notification settings.
    pub notification: NotificationOptions,
}

impl Account {
    /// A connector for this account.
    pub fn connector(&self) -> imap_transport::ImapConnector {
        imap_transport::ImapConnector {
            host: self.host.clone(),
            port: self.port,
            tls_mode: self.tls_mode,
            tls_server_name: self.tls_server_name.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// Convert config TLS mode to IMAP TLS mode.
const fn map_tls_mode(mode: config_core::TlsMode) -> imap_transport::TlsMode {
    match mode {
        config_core::TlsMode::Implicit => imap_transport::TlsMode::Implicit,
        config_core::TlsMode::StartTls => imap_transport::TlsMode::StartTls,
    }
}

/// Resolve the period setting of a profile.
fn resolve_period(
    profile: &str,
    period: Option<config_core::PeriodConfig>,
) -> Result<Period, ConfigError> {
    match period {
        None | Some(config_core::PeriodConfig::Enabled(false)) => Ok(Period::Disabled),
        Some(config_core::PeriodConfig::Enabled(true)) => Err(ConfigError::PeriodWithoutSeconds {
            profile: profile.to_owned(),
        }),
        Some(config_core::PeriodConfig::Seconds(0)) => Err(ConfigError::ZeroPeriod {
            profile: profile.to_owned(),
        }),
        Some(config_core::PeriodConfig::Seconds(secs)) => {
            Ok(Period::Every(Duration::from_secs(secs)))
        }
    }
}

/// Pick the profile and merge it with the command line overrides.
pub fn resolve(config: &config_core::Config, overrides: Overrides) -> Result<Account, ConfigError> {
    let Overrides {
        profile,
        username,
        password,
    } = overrides;

    let name = profile
        .or_else(|| config.profile.clone())
        .ok_or(ConfigError::NoProfileSelected)?;
    let profile = config
        .profiles
        .get(&name)
        .ok_or_else(|| ConfigError::UnknownProfile(name.clone()))?;

    let host = profile
        .hostname
        .clone()
        .ok_or_else(|| ConfigError::MissingHost {
            profile: name.clone(),
        })?;
    let username = username
        .or_else(|| profile.user_id.clone())
        .ok_or_else(|| ConfigError::MissingUser {
            profile: name.clone(),
        })?;
    let password = password
        .or_else(|| profile.password.clone())
        .ok_or_else(|| ConfigError::MissingPassword {
            profile: name.clone(),
        })?;

    let tls_mode = map_tls_mode(profile.tls.mode);
    let port = profile.port.unwrap_or_else(|| tls_mode.default_port());
    if port == 0 {
        return Err(ConfigError::InvalidPort { profile: name });
    }
    let tls_server_name = profile
        .tls
        .server_name
        .clone()
        .unwrap_or_else(|| host.clone());

    let period = resolve_period(&name, profile.period)?;

    let exclusions = Exclusions::new(
        config.excluded_mailboxes.names.iter().cloned(),
        config.excluded_mailboxes.flags.iter().cloned(),
    );

    let notification = NotificationOptions {
        backend: profile.notification.backend,
        app_name: profile
            .notification
            .app_name
            .clone()
            .unwrap_or_else(|| name.clone()),
        icon: profile.notification.icon.clone(),
        sticky: profile.notification.sticky,
        url: profile.notification.url.clone(),
    };

    Ok(Account {
        profile: name,
        host,
        port,
        tls_mode,
        tls_server_name,
        username,
        password: password.into(),
        period,
        exclusions,
        notification,
    })
}
