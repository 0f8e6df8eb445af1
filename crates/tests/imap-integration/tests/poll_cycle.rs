//! Docker-backed IMAP integration tests.

use std::error::Error;

use fake_transport::RecordingNotifier;
use futures::TryStreamExt as _;
use imap_integration::PlainConnector;
use mailbox_filter::Exclusions;
use poll_cycle::{CycleOutcome, Params};
use tokio_util::sync::CancellationToken;
use transport_core::{Connector as _, Session as _};
use unseen_tracker::UnseenTracker;

const IMAP_USER: &str = "test";
const IMAP_PASSWORD: &str = "secret";

fn message(from: &str, subject: &str) -> Vec<u8> {
    format!("From: {from}\r\nSubject: {subject}\r\n\r\nHello from tests.\r\n").into_bytes()
}

async fn cycle(
    connector: &PlainConnector,
    tracker: &mut UnseenTracker,
    exclusions: &Exclusions,
    notifier: &RecordingNotifier,
) -> Result<usize, Box<dyn Error + Send + Sync>> {
    let mut session = connector.connect().await?;
    let outcome = poll_cycle::run(Params {
        session: &mut session,
        tracker,
        exclusions,
        notifier,
        cancel: &CancellationToken::new(),
    })
    .await?;
    session.logout().await?;

    match outcome {
        CycleOutcome::Completed(report) => Ok(report.messages_notified),
        CycleOutcome::CancelledMidway => Err("cycle was cancelled".into()),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unseen_messages_are_reported_once() -> Result<(), Box<dyn Error + Send + Sync>> {
    imap_integration::require_integration_tests_enabled()?;

    let greenmail = imap_integration::GreenMail::start(IMAP_USER, IMAP_PASSWORD).await?;
    let mut mailer = greenmail.mailer().await?;

    let drafts = imap_utf7::encode("Черновики");
    mailer.create(&drafts).await?;

    mailer
        .append("INBOX", None, None, message("bob@example.com", "Read"))
        .await?;
    mailer.select("INBOX").await?;
    let _: Vec<_> = mailer
        .store("1", "+FLAGS (\\Seen)")
        .await?
        .try_collect()
        .await?;
    mailer.close().await?;
    mailer
        .append("INBOX", None, None, message("alice@example.com", "First"))
        .await?;
    mailer
        .append(&drafts, None, None, message("me@example.com", "Unsent"))
        .await?;

    let connector = greenmail.connector();
    let exclusions = Exclusions::new(["Черновики".to_owned()], Vec::<String>::new());
    let notifier = RecordingNotifier::new();
    let mut tracker = UnseenTracker::new();

    let notified = cycle(&connector, &mut tracker, &exclusions, &notifier).await?;
    assert_eq!(notified, 1);
    assert_eq!(
        notifier.notifications(),
        [("alice@example.com".to_owned(), "First".to_owned())]
    );

    let notified = cycle(&connector, &mut tracker, &exclusions, &notifier).await?;
    assert_eq!(notified, 0);

    mailer
        .append("INBOX", None, None, message("carol@example.com", "Second"))
        .await?;
    mailer.noop().await?;

    let notified = cycle(&connector, &mut tracker, &exclusions, &notifier).await?;
    assert_eq!(notified, 1);
    assert_eq!(
        notifier.notifications().last(),
        Some(&("carol@example.com".to_owned(), "Second".to_owned()))
    );

    mailer.logout().await?;

    Ok(())
}
