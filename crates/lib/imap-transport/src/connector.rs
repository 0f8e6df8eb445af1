//! Connect and log in to an IMAP server.

use transport_core::TransportError;

use crate::{ConnectError, ImapSession, Password, TlsMode, TlsStream};

/// Opens authenticated IMAP sessions for one account.
#[derive(Debug, Clone)]
pub struct ImapConnector {
    /// Hostname or IP address of the IMAP server.
    pub host: String,

    /// IMAP port.
    pub port: u16,

    /// TLS mode.
    pub tls_mode: TlsMode,

    /// TLS server name (SNI).
    pub tls_server_name: String,

    /// Username for authentication.
    pub username: String,

    /// Password for authentication.
    pub password: Password,
}

impl ImapConnector {
    /// Connect, secure the stream and read the greeting.
    async fn open(&self) -> Result<async_imap::Client<TlsStream>, ConnectError> {
        tracing::debug!(
            imap_host = %self.host,
            imap_port = self.port,
            imap_tls_mode = ?self.tls_mode,
            tls_server_name = %self.tls_server_name,
            "connecting to an IMAP server"
        );

        let tcp_stream = tokio::net::TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(ConnectError::TcpConnect)?;
        let tls = crate::tls::connector().map_err(ConnectError::Tls)?;

        let client = match self.tls_mode {
            TlsMode::Implicit => {
                let stream = crate::tls::handshake(&tls, &self.tls_server_name, tcp_stream)
                    .await
                    .map_err(ConnectError::Tls)?;
                let mut client = async_imap::Client::new(stream);
                client
                    .read_response()
                    .await?
                    .ok_or(ConnectError::MissingGreeting)?;
                client
            }
            TlsMode::StartTls => {
                let mut client = async_imap::Client::new(tcp_stream);
                client
                    .read_response()
                    .await?
                    .ok_or(ConnectError::MissingGreeting)?;
                client.run_command_and_check_ok("STARTTLS", None).await?;
                let tcp_stream = client.into_inner();
                let stream = crate::tls::handshake(&tls, &self.tls_server_name, tcp_stream)
                    .await
                    .map_err(ConnectError::Tls)?;
                async_imap::Client::new(stream)
            }
        };

        Ok(client)
    }

    async fn connect_and_login(&self) -> Result<ImapSession<TlsStream>, ConnectError> {
        let client = self.open().await?;
        let session = client
            .login(&self.username, self.password.expose())
            .await
            .map_err(|(err, _client)| ConnectError::Login(err))?;

        tracing::debug!(imap_host = %self.host, imap_user = %self.username, "logged in");
        Ok(ImapSession::new(session))
    }
}

impl transport_core::Connector for ImapConnector {
    type Session = ImapSession<TlsStream>;

    async fn connect(&self) -> Result<Self::Session, TransportError> {
        Ok(self.connect_and_login().await?)
    }
}
