//! Shared configuration types for mail-checker.

use std::collections::BTreeMap;

/// Root configuration.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Name of the profile used when none is given on the command line.
    pub profile: Option<String>,

    /// Account profiles by name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub profiles: BTreeMap<String, ProfileConfig>,

    /// Mailboxes skipped for every profile.
    #[cfg_attr(feature = "serde", serde(default))]
    pub excluded_mailboxes: ExcludedMailboxes,
}

/// Mailbox exclusion lists.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExcludedMailboxes {
    /// Decoded mailbox names.
    #[cfg_attr(feature = "serde", serde(default))]
    pub names: Vec<String>,

    /// Mailbox attribute flags, e.g. `\Junk`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: Vec<String>,
}

/// A single IMAP account.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileConfig {
    /// Hostname or IP address of the IMAP server.
    pub hostname: Option<String>,

    /// Optional port override.
    pub port: Option<u16>,

    /// TLS settings.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tls: TlsConfig,

    /// Login name. May be given on the command line instead.
    pub user_id: Option<String>,

    /// Login password. May be given on the command line instead.
    pub password: Option<String>,

    /// Polling period; absent or `false` runs a single check.
    pub period: Option<PeriodConfig>,

    /// Notification display options.
    #[cfg_attr(feature = "serde", serde(default))]
    pub notification: NotificationConfig,
}

/// TLS configuration for a server.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TlsConfig {
    /// TLS mode.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: TlsMode,

    /// Optional override for the TLS server name (SNI).
    pub server_name: Option<String>,
}

/// Supported TLS modes.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum TlsMode {
    /// Implicit TLS (usually port 993).
    #[default]
    Implicit,

    /// STARTTLS upgrade (usually port 143).
    #[cfg_attr(feature = "serde", serde(rename = "starttls", alias = "start_tls"))]
    StartTls,
}

/// Polling period setting.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PeriodConfig {
    /// Poll every this many seconds.
    Seconds(u64),

    /// `false` disables periodic polling.
    Enabled(bool),
}

/// Where notifications go.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum NotificationBackend {
    /// Desktop notifications.
    #[default]
    Desktop,

    /// Log lines only.
    Log,
}

/// Notification display options.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationConfig {
    /// Notification backend.
    #[cfg_attr(feature = "serde", serde(default))]
    pub backend: NotificationBackend,

    /// Application name shown with notifications. Defaults to the profile name.
    pub app_name: Option<String>,

    /// Icon name or path.
    pub icon: Option<String>,

    /// Keep notifications on screen until dismissed.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sticky: bool,

    /// Page opened when a notification is clicked, usually the webmail.
    pub url: Option<String>,
}
