//! TLS setup for IMAP connections.

/// TLS stream type used for IMAP connections.
pub type TlsStream = tokio_rustls::client::TlsStream<tokio::net::TcpStream>;

/// How to secure the IMAP connection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TlsMode {
    /// Implicit TLS.
    Implicit,

    /// Start with plaintext and upgrade using STARTTLS.
    StartTls,
}

impl TlsMode {
    /// The conventional port for the mode.
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Implicit => 993,
            Self::StartTls => 143,
        }
    }
}

/// Errors returned while preparing or establishing a TLS connection.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    /// Failed to load system root certificates.
    #[error("failed to load system root certificates: {0}")]
    RootCerts(#[from] rustls_native_certs::Error),

    /// Invalid DNS name for TLS verification.
    #[error("invalid DNS name: {0}")]
    InvalidDnsName(String),

    /// TLS handshake or I/O error.
    #[error("TLS I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build a rustls connector trusting the system root certificates.
pub fn connector() -> Result<tokio_rustls::TlsConnector, TlsError> {
    let mut root_store = rustls::RootCertStore::empty();
    let rustls_native_certs::CertificateResult { certs, errors, .. } =
        rustls_native_certs::load_native_certs();
    if certs.is_empty() {
        if let Some(err) = errors.into_iter().next() {
            return Err(TlsError::RootCerts(err));
        }
    } else {
        for err in errors {
            tracing::debug!(%err, "skipping unreadable root certificate source");
        }
    }

    let (added, ignored) = root_store.add_parsable_certificates(certs);
    tracing::trace!(added, ignored, "loaded root certificates");

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    Ok(tokio_rustls::TlsConnector::from(std::sync::Arc::new(
        config,
    )))
}

/// Run the TLS handshake over an existing TCP stream.
pub async fn handshake(
    connector: &tokio_rustls::TlsConnector,
    server_name: &str,
    stream: tokio::net::TcpStream,
) -> Result<TlsStream, TlsError> {
    let name = rustls::pki_types::ServerName::try_from(server_name.to_owned())
        .map_err(|_| TlsError::InvalidDnsName(server_name.to_owned()))?;
    let tls_stream = connector.connect(name, stream).await?;
    Ok(tls_stream)
}
