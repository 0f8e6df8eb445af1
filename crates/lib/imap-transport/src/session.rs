//! `transport_core::Session` over an async-imap session.

use async_imap::types::NameAttribute;
use futures::TryStreamExt as _;
use transport_core::{FetchedHeader, MailboxDescriptor, TransportError};

use crate::ResponseError;
use crate::error::classify;

/// Header-only fetch that leaves the `\Seen` flag untouched.
const FETCH_HEADERS: &str = "(UID BODY.PEEK[HEADER])";

/// An authenticated IMAP session.
#[derive(Debug)]
pub struct ImapSession<S>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + std::fmt::Debug,
{
    /// The underlying session.
    inner: async_imap::Session<S>,

    /// The selected mailbox and the UIDNEXT it reported.
    selected: Option<(String, Option<u32>)>,
}

impl<S> ImapSession<S>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + std::fmt::Debug,
{
    /// Wrap an authenticated session.
    pub const fn new(inner: async_imap::Session<S>) -> Self {
        Self {
            inner,
            selected: None,
        }
    }
}

/// Render a LIST attribute the way the server spells it.
fn attribute_flag(attribute: &NameAttribute<'_>) -> String {
    match attribute {
        NameAttribute::Extension(name) => name.to_string(),
        NameAttribute::NoSelect => "\\Noselect".to_owned(),
        NameAttribute::NoInferiors => "\\Noinferiors".to_owned(),
        other => format!("\\{other:?}"),
    }
}

/// Render UIDs as a comma-separated sequence set.
fn uid_set(uids: &[u32]) -> String {
    let mut set = String::new();
    for uid in uids {
        if !set.is_empty() {
            set.push(',');
        }
        set.push_str(&uid.to_string());
    }
    set
}

impl<S> transport_core::Session for ImapSession<S>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + std::fmt::Debug,
{
    async fn list_mailboxes(&mut self) -> Result<Vec<MailboxDescriptor>, TransportError> {
        let names: Vec<_> = self
            .inner
            .list(None, Some("*"))
            .await
            .map_err(classify)?
            .try_collect()
            .await
            .map_err(classify)?;

        Ok(names
            .iter()
            .map(|name| MailboxDescriptor {
                flags: name.attributes().iter().map(attribute_flag).collect(),
                delimiter: name.delimiter().map(str::to_owned),
                name: name.name().to_owned(),
            })
            .collect())
    }

    async fn select(&mut self, mailbox: &str, read_only: bool) -> Result<(), TransportError> {
        let status = if read_only {
            self.inner.examine(mailbox).await
        } else {
            self.inner.select(mailbox).await
        }
        .map_err(classify)?;

        tracing::trace!(
            imap_mailbox = %mailbox,
            exists = status.exists,
            uid_next = ?status.uid_next,
            "mailbox selected"
        );

        self.selected = Some((mailbox.to_owned(), status.uid_next));
        Ok(())
    }

    async fn query_next_id(&mut self, mailbox: &str) -> Result<u32, TransportError> {
        if let Some((selected, Some(uid_next))) = &self.selected {
            if selected == mailbox {
                return Ok(*uid_next);
            }
        }

        let status = self
            .inner
            .status(mailbox, "(UIDNEXT)")
            .await
            .map_err(classify)?;
        status
            .uid_next
            .ok_or_else(|| ResponseError::MissingUidNext(mailbox.to_owned()).into())
    }

    async fn search_unseen(
        &mut self,
        window: &unseen_tracker::Window,
    ) -> Result<Vec<u32>, TransportError> {
        if self.selected.is_none() {
            return Err(ResponseError::NotSelected.into());
        }

        let uids = self
            .inner
            .uid_search(window.criteria())
            .await
            .map_err(classify)?;
        Ok(uids.into_iter().collect())
    }

    async fn fetch_headers(&mut self, uids: &[u32]) -> Result<Vec<FetchedHeader>, TransportError> {
        if uids.is_empty() {
            return Ok(Vec::new());
        }

        let fetches: Vec<_> = self
            .inner
            .uid_fetch(uid_set(uids), FETCH_HEADERS)
            .await
            .map_err(classify)?
            .try_collect()
            .await
            .map_err(classify)?;

        Ok(fetches
            .iter()
            .filter_map(|fetch| {
                let uid = fetch.uid?;
                let raw = fetch.header()?;
                Some(FetchedHeader {
                    uid,
                    raw: raw.to_vec(),
                })
            })
            .collect())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.selected.take().is_none() {
            return Ok(());
        }
        self.inner.close().await.map_err(classify)
    }

    async fn logout(mut self) -> Result<(), TransportError> {
        self.inner.logout().await.map_err(classify)
    }
}
