//! Core mail transport contract used by the polling engine.

use std::future::Future;

/// A boxed error used as the source of transport errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A mailbox as reported by the server listing.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MailboxDescriptor {
    /// Attribute flags, e.g. `\Noselect`.
    pub flags: Vec<String>,

    /// Hierarchy delimiter, if the server reports one.
    pub delimiter: Option<String>,

    /// Raw mailbox name in the protocol encoding.
    pub name: String,
}

impl MailboxDescriptor {
    /// Whether the mailbox carries the given attribute flag.
    ///
    /// Attribute flags are case-insensitive.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|own| own.eq_ignore_ascii_case(flag))
    }
}

/// Raw header block of a single message.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FetchedHeader {
    /// The message UID.
    pub uid: u32,

    /// Raw RFC 5322 header bytes.
    pub raw: Vec<u8>,
}

/// Transport errors, classified for the retry policy.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Network or connection level failure, worth retrying.
    #[error("transient transport error: {0}")]
    Transient(#[source] BoxError),

    /// The server rejected a command or sent something unusable.
    #[error("protocol error: {0}")]
    Protocol(#[source] BoxError),
}

impl TransportError {
    /// Wrap an error as transient.
    pub fn transient(error: impl Into<BoxError>) -> Self {
        Self::Transient(error.into())
    }

    /// Wrap an error as a protocol error.
    pub fn protocol(error: impl Into<BoxError>) -> Self {
        Self::Protocol(error.into())
    }

    /// Whether the retry policy applies to this error.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Establishes authenticated sessions.
pub trait Connector: Send + Sync + 'static {
    /// The session type produced.
    type Session: Session;

    /// Connect and log in.
    fn connect(&self) -> impl Future<Output = Result<Self::Session, TransportError>> + Send;
}

/// An authenticated mail session.
pub trait Session: Send {
    /// List all mailboxes.
    fn list_mailboxes(
        &mut self,
    ) -> impl Future<Output = Result<Vec<MailboxDescriptor>, TransportError>> + Send;

    /// Select a mailbox by its raw name.
    fn select(
        &mut self,
        mailbox: &str,
        read_only: bool,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// The next UID the server will assign in the mailbox.
    fn query_next_id(
        &mut self,
        mailbox: &str,
    ) -> impl Future<Output = Result<u32, TransportError>> + Send;

    /// Search the selected mailbox for unseen messages within the window.
    fn search_unseen(
        &mut self,
        window: &unseen_tracker::Window,
    ) -> impl Future<Output = Result<Vec<u32>, TransportError>> + Send;

    /// Fetch header-only data for the given UIDs of the selected mailbox.
    fn fetch_headers(
        &mut self,
        uids: &[u32],
    ) -> impl Future<Output = Result<Vec<FetchedHeader>, TransportError>> + Send;

    /// Close the selected mailbox.
    fn close(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// End the session.
    fn logout(self) -> impl Future<Output = Result<(), TransportError>> + Send;
}
