//! In-memory mail server for exercising the polling engine without a network.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use transport_core::{Connector, FetchedHeader, MailboxDescriptor, Session, TransportError};
use unseen_tracker::Window;

mod recording;

pub use self::recording::*;

/// A transport operation that can be made to fail.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Op {
    /// Connecting and logging in.
    Connect,

    /// Listing mailboxes.
    List,

    /// Selecting a mailbox.
    Select,

    /// Searching the selected mailbox.
    Search,

    /// Fetching headers.
    Fetch,
}

/// The kind of injected failure.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Failure {
    /// Fails with a retryable error.
    Transient,

    /// Fails with a non-retryable error.
    Protocol,
}

/// A call observed by the server, in order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Call {
    /// A new session was opened.
    Connect,

    /// Mailboxes were listed.
    List,

    /// A mailbox was selected.
    Select(String),

    /// The selected mailbox was searched with the given criteria.
    Search {
        /// The selected mailbox.
        mailbox: String,

        /// The rendered search criteria.
        criteria: String,
    },

    /// Headers were fetched.
    Fetch {
        /// The selected mailbox.
        mailbox: String,

        /// Requested UIDs.
        uids: Vec<u32>,
    },

    /// The selected mailbox was closed.
    Close(String),

    /// The session ended.
    Logout,
}

/// Errors produced by the fake server.
#[derive(Debug, thiserror::Error)]
pub enum FakeError {
    /// A failure queued with `fail_next`.
    #[error("injected failure in {0:?}")]
    Injected(Op),

    /// The mailbox does not exist.
    #[error("no such mailbox: {0}")]
    NoSuchMailbox(String),

    /// A mailbox-level command was issued without a selection.
    #[error("no mailbox selected")]
    NotSelected,
}

/// Hook invoked right after a mailbox is selected.
pub type SelectHook = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Clone)]
struct Message {
    seen: bool,
    raw: Vec<u8>,
}

#[derive(Debug)]
struct Mailbox {
    descriptor: MailboxDescriptor,
    uid_next: u32,
    messages: BTreeMap<u32, Message>,
}

#[derive(Default)]
struct State {
    mailboxes: Vec<Mailbox>,
    failures: HashMap<Op, VecDeque<Failure>>,
    search_overrides: HashMap<String, VecDeque<Vec<u32>>>,
    select_delay: Option<Duration>,
    on_select: Option<SelectHook>,
    journal: Vec<Call>,
    connects: usize,
}

impl State {
    fn mailbox(&self, name: &str) -> Result<&Mailbox, TransportError> {
        self.mailboxes
            .iter()
            .find(|mailbox| mailbox.descriptor.name == name)
            .ok_or_else(|| TransportError::protocol(FakeError::NoSuchMailbox(name.to_owned())))
    }

    fn mailbox_mut(&mut self, name: &str) -> Option<&mut Mailbox> {
        self.mailboxes
            .iter_mut()
            .find(|mailbox| mailbox.descriptor.name == name)
    }

    fn take_failure(&mut self, op: Op) -> Result<(), TransportError> {
        let Some(failure) = self.failures.get_mut(&op).and_then(VecDeque::pop_front) else {
            return Ok(());
        };

        let error = FakeError::Injected(op);
        Err(match failure {
            Failure::Transient => TransportError::transient(error),
            Failure::Protocol => TransportError::protocol(error),
        })
    }
}

/// A scriptable in-memory mail server.
#[derive(Clone, Default)]
pub struct FakeServer {
    state: Arc<Mutex<State>>,
}

impl FakeServer {
    /// Create an empty server.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    /// Add a mailbox with the given raw name and attribute flags.
    pub fn add_mailbox(&self, name: &str, flags: &[&str]) -> &Self {
        self.lock().mailboxes.push(Mailbox {
            descriptor: MailboxDescriptor {
                flags: flags.iter().map(|&flag| flag.to_owned()).collect(),
                delimiter: Some("/".to_owned()),
                name: name.to_owned(),
            },
            uid_next: 1,
            messages: BTreeMap::new(),
        });
        self
    }

    /// Deliver an unseen message, returning its UID.
    ///
    /// # Panics
    ///
    /// Panics if the mailbox does not exist.
    pub fn deliver(&self, mailbox: &str, from: &str, subject: &str) -> u32 {
        let raw = format!("From: {from}\r\nSubject: {subject}\r\nMessage-ID: <{subject}@fake>\r\n\r\n");
        self.deliver_raw(mailbox, raw.into_bytes())
    }

    /// Deliver an unseen message with the given raw header block.
    ///
    /// # Panics
    ///
    /// Panics if the mailbox does not exist.
    pub fn deliver_raw(&self, mailbox: &str, raw: Vec<u8>) -> u32 {
        let mut state = self.lock();
        let mailbox = state.mailbox_mut(mailbox).expect("unknown mailbox");
        let uid = mailbox.uid_next;
        mailbox.uid_next += 1;
        mailbox.messages.insert(uid, Message { seen: false, raw });
        uid
    }

    /// Mark a message as seen.
    ///
    /// # Panics
    ///
    /// Panics if the mailbox or message does not exist.
    pub fn mark_seen(&self, mailbox: &str, uid: u32) {
        let mut state = self.lock();
        let mailbox = state.mailbox_mut(mailbox).expect("unknown mailbox");
        mailbox.messages.get_mut(&uid).expect("unknown message").seen = true;
    }

    /// Bump the next UID of a mailbox without delivering anything.
    ///
    /// # Panics
    ///
    /// Panics if the mailbox does not exist.
    pub fn set_uid_next(&self, mailbox: &str, uid_next: u32) {
        let mut state = self.lock();
        state.mailbox_mut(mailbox).expect("unknown mailbox").uid_next = uid_next;
    }

    /// Make the next search in the mailbox return exactly these UIDs.
    pub fn override_next_search(&self, mailbox: &str, uids: Vec<u32>) {
        self.lock()
            .search_overrides
            .entry(mailbox.to_owned())
            .or_default()
            .push_back(uids);
    }

    /// Queue a failure for the next invocation of the operation.
    pub fn fail_next(&self, op: Op, failure: Failure) {
        self.lock().failures.entry(op).or_default().push_back(failure);
    }

    /// Delay every select by the given duration.
    pub fn set_select_delay(&self, delay: Duration) {
        self.lock().select_delay = Some(delay);
    }

    /// Run a hook after every successful select.
    pub fn on_select(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        self.lock().on_select = Some(Arc::new(hook));
    }

    /// All calls observed so far.
    pub fn journal(&self) -> Vec<Call> {
        self.lock().journal.clone()
    }

    /// Forget the calls observed so far.
    pub fn clear_journal(&self) {
        self.lock().journal.clear();
    }

    /// Number of connection attempts so far, failed ones included.
    pub fn connects(&self) -> usize {
        self.lock().connects
    }

    /// A connector opening sessions against this server.
    pub fn connector(&self) -> FakeConnector {
        FakeConnector {
            server: self.clone(),
        }
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Opens sessions against a `FakeServer`.
#[derive(Clone)]
pub struct FakeConnector {
    server: FakeServer,
}

impl Connector for FakeConnector {
    type Session = FakeSession;

    async fn connect(&self) -> Result<Self::Session, TransportError> {
        {
            let mut state = self.server.lock();
            state.connects += 1;
            state.take_failure(Op::Connect)?;
            state.journal.push(Call::Connect);
        }

        Ok(FakeSession {
            state: Arc::clone(&self.server.state),
            selected: None,
        })
    }
}

/// A session against a `FakeServer`.
pub struct FakeSession {
    state: Arc<Mutex<State>>,
    selected: Option<String>,
}

impl FakeSession {
    fn selected(&self) -> Result<String, TransportError> {
        self.selected
            .clone()
            .ok_or_else(|| TransportError::protocol(FakeError::NotSelected))
    }
}

/// Emulate `UID SEARCH` over the unseen messages of a mailbox.
///
/// A `UID n:*` range always includes the highest UID, even when it is below `n`.
fn search(mailbox: &Mailbox, window: &Window) -> Vec<u32> {
    let unseen = |uid: &u32| !mailbox.messages[uid].seen;

    if !window.has_prior_boundary {
        return mailbox.messages.keys().copied().filter(unseen).collect();
    }

    let mut in_range: Vec<u32> = mailbox
        .messages
        .range(window.boundary..)
        .map(|(&uid, _)| uid)
        .collect();

    if in_range.is_empty() {
        in_range.extend(mailbox.messages.keys().next_back().copied());
    }

    in_range.into_iter().filter(unseen).collect()
}

impl Session for FakeSession {
    async fn list_mailboxes(&mut self) -> Result<Vec<MailboxDescriptor>, TransportError> {
        let mut state = lock(&self.state);
        state.take_failure(Op::List)?;
        state.journal.push(Call::List);
        Ok(state
            .mailboxes
            .iter()
            .map(|mailbox| mailbox.descriptor.clone())
            .collect())
    }

    async fn select(&mut self, mailbox: &str, _read_only: bool) -> Result<(), TransportError> {
        let delay = lock(&self.state).select_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let hook = {
            let mut state = lock(&self.state);
            state.take_failure(Op::Select)?;
            state.mailbox(mailbox)?;
            state.journal.push(Call::Select(mailbox.to_owned()));
            state.on_select.clone()
        };

        self.selected = Some(mailbox.to_owned());

        if let Some(hook) = hook {
            hook(mailbox);
        }

        Ok(())
    }

    async fn query_next_id(&mut self, mailbox: &str) -> Result<u32, TransportError> {
        let state = lock(&self.state);
        Ok(state.mailbox(mailbox)?.uid_next)
    }

    async fn search_unseen(&mut self, window: &Window) -> Result<Vec<u32>, TransportError> {
        let selected = self.selected()?;
        let mut state = lock(&self.state);
        state.take_failure(Op::Search)?;
        state.journal.push(Call::Search {
            mailbox: selected.clone(),
            criteria: window.criteria(),
        });

        if let Some(uids) = state
            .search_overrides
            .get_mut(&selected)
            .and_then(VecDeque::pop_front)
        {
            return Ok(uids);
        }

        Ok(search(state.mailbox(&selected)?, window))
    }

    async fn fetch_headers(&mut self, uids: &[u32]) -> Result<Vec<FetchedHeader>, TransportError> {
        let selected = self.selected()?;
        let mut state = lock(&self.state);
        state.take_failure(Op::Fetch)?;
        state.journal.push(Call::Fetch {
            mailbox: selected.clone(),
            uids: uids.to_vec(),
        });

        let mailbox = state.mailbox(&selected)?;
        Ok(uids
            .iter()
            .filter_map(|uid| {
                mailbox.messages.get(uid).map(|message| FetchedHeader {
                    uid: *uid,
                    raw: message.raw.clone(),
                })
            })
            .collect())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let selected = self.selected()?;
        lock(&self.state).journal.push(Call::Close(selected));
        self.selected = None;
        Ok(())
    }

    async fn logout(self) -> Result<(), TransportError> {
        lock(&self.state).journal.push(Call::Logout);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FakeServer, Session as _};
    use transport_core::Connector as _;
    use unseen_tracker::Window;

    #[tokio::test]
    async fn open_range_includes_highest_uid() {
        let server = FakeServer::new();
        server.add_mailbox("INBOX", &[]);
        let uid = server.deliver("INBOX", "a@example.com", "hello");

        let mut session = server.connector().connect().await.unwrap();
        session.select("INBOX", true).await.unwrap();

        let uids = session
            .search_unseen(&Window::from_boundary(uid + 10))
            .await
            .unwrap();
        assert_eq!(uids, vec![uid]);
    }

    #[tokio::test]
    async fn seen_messages_are_not_returned() {
        let server = FakeServer::new();
        server.add_mailbox("INBOX", &[]);
        let first = server.deliver("INBOX", "a@example.com", "one");
        let second = server.deliver("INBOX", "b@example.com", "two");
        server.mark_seen("INBOX", first);

        let mut session = server.connector().connect().await.unwrap();
        session.select("INBOX", true).await.unwrap();

        let uids = session
            .search_unseen(&Window::unconstrained())
            .await
            .unwrap();
        assert_eq!(uids, vec![second]);
    }
}
