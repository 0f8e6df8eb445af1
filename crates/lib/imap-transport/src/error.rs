//! Mapping of IMAP failures onto transport errors.

use transport_core::TransportError;

/// Errors returned while connecting and logging in.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// TCP connection error.
    #[error("TCP connection error: {0}")]
    TcpConnect(#[source] std::io::Error),

    /// TLS setup or handshake error.
    #[error("TLS error: {0}")]
    Tls(#[source] crate::TlsError),

    /// IMAP protocol error before login.
    #[error("IMAP error: {0}")]
    Imap(#[from] async_imap::error::Error),

    /// The server did not send the expected greeting.
    #[error("IMAP server sent no greeting")]
    MissingGreeting,

    /// The server rejected the credentials.
    #[error("login: {0}")]
    Login(#[source] async_imap::error::Error),
}

impl ConnectError {
    /// Whether the failure is network-level.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::TcpConnect(_) | Self::MissingGreeting => true,
            Self::Tls(crate::TlsError::Io(_)) => true,
            Self::Tls(_) => false,
            Self::Imap(err) | Self::Login(err) => is_transient(err),
        }
    }
}

impl From<std::io::Error> for ConnectError {
    fn from(err: std::io::Error) -> Self {
        Self::Imap(async_imap::error::Error::Io(err))
    }
}

impl From<ConnectError> for TransportError {
    fn from(err: ConnectError) -> Self {
        if err.is_transient() {
            Self::transient(err)
        } else {
            Self::protocol(err)
        }
    }
}

/// Whether an IMAP error is network-level rather than a rejected command.
pub fn is_transient(err: &async_imap::error::Error) -> bool {
    matches!(
        err,
        async_imap::error::Error::Io(_) | async_imap::error::Error::ConnectionLost
    )
}

/// Classify an IMAP error.
pub fn classify(err: async_imap::error::Error) -> TransportError {
    if is_transient(&err) {
        TransportError::transient(err)
    } else {
        TransportError::protocol(err)
    }
}

/// A response that lacked something the session relies on.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// The server reported no UIDNEXT for the mailbox.
    #[error("server reported no UIDNEXT for {0}")]
    MissingUidNext(String),

    /// A mailbox-level command was issued without a selection.
    #[error("no mailbox selected")]
    NotSelected,
}

impl From<ResponseError> for TransportError {
    fn from(err: ResponseError) -> Self {
        Self::protocol(err)
    }
}
