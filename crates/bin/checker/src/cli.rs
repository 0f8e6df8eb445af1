//! Command line arguments.

use std::path::PathBuf;

/// Check the mailboxes of an IMAP account and notify about new unread
/// messages.
#[derive(Debug, clap::Parser)]
#[command(name = "mail-checker", version)]
pub struct Args {
    /// Log debug details.
    #[arg(short, long)]
    pub verbose: bool,

    /// Settings file to use instead of the default locations.
    #[arg(short, long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Profile from the settings file.
    #[arg(short, long)]
    pub profile: Option<String>,

    /// User to log in as.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password to log in with.
    #[arg(short = 'x', long = "pass")]
    pub password: Option<String>,
}

impl Args {
    /// The values that override the settings file.
    pub fn overrides(&self) -> config_bringup::Overrides {
        config_bringup::Overrides {
            profile: self.profile.clone(),
            username: self.user.clone(),
            password: self.password.clone(),
        }
    }
}
