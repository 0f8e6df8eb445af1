//! Main entrypoint for the mailbox listing helper.

use std::path::PathBuf;

use clap::Parser as _;
use color_eyre::eyre::WrapErr as _;
use mailbox_filter::Decision;
use transport_core::{Connector as _, Session as _};

/// Print every mailbox of the account and whether the checker scans it.
#[derive(Debug, clap::Parser)]
#[command(name = "mail-checker-list", version)]
struct Args {
    /// Settings file to use instead of the default locations.
    #[arg(short, long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Profile from the settings file.
    #[arg(short, long)]
    profile: Option<String>,

    /// User to log in as.
    #[arg(short, long)]
    user: Option<String>,

    /// Password to log in with.
    #[arg(short = 'x', long = "pass")]
    password: Option<String>,
}

/// Run the mailbox listing helper.
#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = config_load::with_default_env_var(args.settings)
        .await
        .wrap_err("unable to load settings")?;
    let overrides = config_bringup::Overrides {
        profile: args.profile,
        username: args.user,
        password: args.password,
    };
    let account = config_bringup::resolve(&config.payload, overrides)?;
    drop(config);

    tracing::info!(
        profile = %account.profile,
        host = %account.host,
        port = account.port,
        tls_mode = ?account.tls_mode,
        "listing IMAP mailboxes"
    );

    let mut session = account.connector().connect().await?;
    let mailboxes = session.list_mailboxes().await?;

    println!("{}:", account.profile);
    for mailbox in &mailboxes {
        let name = imap_utf7::decode_lossy(&mailbox.name);
        let verdict = describe(&mailbox_filter::decide(mailbox, &account.exclusions));
        println!("  {name}  [{}]  {verdict}", mailbox.flags.join(" "));
    }

    session.logout().await?;

    Ok(())
}

fn describe(decision: &Decision) -> String {
    match decision {
        Decision::Scan => "scanned".to_owned(),
        Decision::ExcludedFlag(flag) => format!("skipped: flag {flag} excluded"),
        Decision::NonSelectable => "skipped: not selectable".to_owned(),
        Decision::ExcludedName(_) => "skipped: name excluded".to_owned(),
    }
}
