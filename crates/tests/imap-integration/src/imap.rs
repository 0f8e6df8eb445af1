//! IMAP connectivity helpers.

use std::time::Duration;

use async_imap::Client;
use imap_transport::ImapSession;
use tokio::net::TcpStream;
use transport_core::TransportError;

/// Connects to the IMAP server with retries until it is ready.
pub async fn connect_with_retry(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
) -> Result<async_imap::Session<TcpStream>, std::io::Error> {
    let mut attempts = 60u8;
    loop {
        let err = match login(host, port, user, password).await {
            Ok(session) => return Ok(session),
            Err(err) => err,
        };

        let Some(attempts_left) = attempts.checked_sub(1) else {
            return Err(err);
        };

        attempts = attempts_left;
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}

async fn login(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
) -> Result<async_imap::Session<TcpStream>, std::io::Error> {
    let stream = TcpStream::connect((host, port)).await?;

    let mut client = Client::new(stream);

    let Some(_) = client.read_response().await? else {
        return Err(std::io::Error::other("missing IMAP greeting"));
    };

    client
        .login(user, password)
        .await
        .map_err(|(err, _)| std::io::Error::other(err))
}

/// Plaintext connector for the GreenMail container.
#[derive(Debug, Clone)]
pub struct PlainConnector {
    /// Container host.
    pub host: String,

    /// Mapped IMAP port.
    pub port: u16,

    /// Login user.
    pub user: String,

    /// Login password.
    pub password: String,
}

impl transport_core::Connector for PlainConnector {
    type Session = ImapSession<TcpStream>;

    async fn connect(&self) -> Result<Self::Session, TransportError> {
        let session = connect_with_retry(&self.host, self.port, &self.user, &self.password)
            .await
            .map_err(TransportError::transient)?;
        Ok(ImapSession::new(session))
    }
}
