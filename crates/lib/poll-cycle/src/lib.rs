//! A single pass over all mailboxes, reporting new unseen messages.

use mailbox_filter::Exclusions;
use message_summary::MessageSummary;
use notifier::Notifier;
use tokio_util::sync::CancellationToken;
use transport_core::{MailboxDescriptor, Session, TransportError};
use unseen_tracker::UnseenTracker;

/// Counters collected over a completed cycle.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct CycleReport {
    /// Mailboxes that passed the filter and were searched.
    pub mailboxes_scanned: usize,

    /// New messages reported to the notifier.
    pub messages_notified: usize,
}

/// How a cycle ended, short of a transport failure.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CycleOutcome {
    /// Every mailbox was visited.
    Completed(CycleReport),

    /// Cancellation was observed before the cycle finished.
    CancelledMidway,
}

/// Parameters for `run`.
pub struct Params<'a, S, N> {
    /// An authenticated session.
    pub session: &'a mut S,

    /// Boundaries carried over from earlier cycles.
    pub tracker: &'a mut UnseenTracker,

    /// Mailboxes to skip.
    pub exclusions: &'a Exclusions,

    /// Where new messages are reported.
    pub notifier: &'a N,

    /// Cooperative cancellation flag.
    pub cancel: &'a CancellationToken,
}

/// Result of scanning one mailbox.
enum Scan {
    /// The mailbox was fully processed.
    Done {
        /// Number of new messages reported.
        messages_notified: usize,
    },

    /// Cancellation was observed inside the mailbox.
    Cancelled,
}

/// Run one cycle over all mailboxes.
pub async fn run<S, N>(params: Params<'_, S, N>) -> Result<CycleOutcome, TransportError>
where
    S: Session,
    N: Notifier,
{
    let Params {
        session,
        tracker,
        exclusions,
        notifier,
        cancel,
    } = params;

    let mailboxes = session.list_mailboxes().await?;
    tracing::debug!(count = mailboxes.len(), "listed mailboxes");

    let mut report = CycleReport::default();

    for mailbox in &mailboxes {
        if cancel.is_cancelled() {
            return Ok(CycleOutcome::CancelledMidway);
        }

        let decision = mailbox_filter::decide(mailbox, exclusions);
        if decision.is_excluded() {
            tracing::trace!(imap_mailbox = %mailbox.name, ?decision, "skipping mailbox");
            continue;
        }

        match scan_mailbox(session, tracker, notifier, cancel, mailbox).await? {
            Scan::Done { messages_notified } => {
                report.mailboxes_scanned += 1;
                report.messages_notified += messages_notified;
            }
            Scan::Cancelled => return Ok(CycleOutcome::CancelledMidway),
        }
    }

    Ok(CycleOutcome::Completed(report))
}

/// Select, search, fetch and notify for a single mailbox.
async fn scan_mailbox<S, N>(
    session: &mut S,
    tracker: &mut UnseenTracker,
    notifier: &N,
    cancel: &CancellationToken,
    mailbox: &MailboxDescriptor,
) -> Result<Scan, TransportError>
where
    S: Session,
    N: Notifier,
{
    let key = mailbox.name.as_str();
    let display_name = imap_utf7::decode_lossy(key);

    session.select(key, true).await?;

    let window = tracker.window_for(key);
    let uid_next = session.query_next_id(key).await?;
    tracker.advance(key, uid_next);

    let mut uids = session.search_unseen(&window).await?;
    uids.sort_unstable();
    uids.dedup();

    tracing::debug!(
        imap_mailbox = %display_name,
        boundary = window.has_prior_boundary.then_some(window.boundary),
        uid_next,
        ?uids,
        "searched for unseen messages"
    );

    if cancel.is_cancelled() {
        session.close().await?;
        return Ok(Scan::Cancelled);
    }

    if uids.is_empty() {
        session.close().await?;
        return Ok(Scan::Done { messages_notified: 0 });
    }

    if window.is_stale(&uids) {
        tracing::debug!(
            imap_mailbox = %display_name,
            boundary = window.boundary,
            "discarding stale search result"
        );
        session.close().await?;
        return Ok(Scan::Done { messages_notified: 0 });
    }

    let mut headers = session.fetch_headers(&uids).await?;
    headers.retain(|header| uids.binary_search(&header.uid).is_ok());
    headers.sort_by_key(|header| header.uid);

    let mut messages_notified = 0;
    for header in headers {
        if cancel.is_cancelled() {
            session.close().await?;
            return Ok(Scan::Cancelled);
        }

        let summary = match MessageSummary::from_header_bytes(&header.raw) {
            Ok(summary) => summary,
            Err(error) => {
                tracing::warn!(imap_mailbox = %display_name, uid = header.uid, %error, "skipping unreadable message");
                continue;
            }
        };

        tracing::info!(
            imap_mailbox = %display_name,
            uid = header.uid,
            from = %summary.from,
            subject = %summary.subject,
            "new message"
        );

        if let Err(error) = notifier.notify(&summary.from, &summary.subject).await {
            tracing::warn!(uid = header.uid, %error, "notification failed");
        }
        messages_notified += 1;
    }

    session.close().await?;
    Ok(Scan::Done { messages_notified })
}
