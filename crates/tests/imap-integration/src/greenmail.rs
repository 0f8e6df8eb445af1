//! GreenMail container helpers.

use testcontainers::{
    ContainerAsync, GenericImage, ImageExt as _, core::IntoContainerPort as _,
    runners::AsyncRunner as _,
};
use tokio::net::TcpStream;

use crate::PlainConnector;

/// A running GreenMail server with a single account.
pub struct GreenMail {
    /// Keeps the container alive.
    _container: ContainerAsync<GenericImage>,

    /// Plaintext IMAP endpoint and credentials.
    connector: PlainConnector,
}

impl GreenMail {
    /// Start a container with one account and wait for its API to come up.
    pub async fn start(
        user: &str,
        password: &str,
    ) -> Result<Self, testcontainers::TestcontainersError> {
        let container = GenericImage::new("greenmail/standalone", "latest")
            .with_exposed_port(crate::IMAP_PORT.tcp())
            .with_wait_for(testcontainers::core::WaitFor::message_on_stdout(
                "Starting GreenMail API server at",
            ))
            .with_env_var("GREENMAIL_USERS", format!("{user}:{password}"))
            .start()
            .await?;

        let host = container.get_host().await?.to_string();
        let port = container.get_host_port_ipv4(crate::IMAP_PORT).await?;

        Ok(Self {
            _container: container,
            connector: PlainConnector {
                host,
                port,
                user: user.to_owned(),
                password: password.to_owned(),
            },
        })
    }

    /// A connector for the checker under test.
    pub fn connector(&self) -> PlainConnector {
        self.connector.clone()
    }

    /// A raw session for seeding mailboxes.
    pub async fn mailer(&self) -> Result<async_imap::Session<TcpStream>, std::io::Error> {
        let PlainConnector {
            host,
            port,
            user,
            password,
        } = &self.connector;
        crate::connect_with_retry(host, *port, user, password).await
    }
}
