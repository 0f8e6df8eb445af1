//! Per-mailbox UID boundaries for incremental unseen message detection.

use std::collections::HashMap;

/// The search window for a single mailbox scan.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Window {
    /// Whether the mailbox has been scanned before.
    pub has_prior_boundary: bool,

    /// The smallest UID not yet reported.
    ///
    /// Meaningless when there is no prior boundary.
    pub boundary: u32,
}

impl Window {
    /// The window used on the very first scan of a mailbox.
    pub const fn unconstrained() -> Self {
        Self {
            has_prior_boundary: false,
            boundary: 0,
        }
    }

    /// The window for a mailbox previously scanned up to `boundary`.
    pub const fn from_boundary(boundary: u32) -> Self {
        Self {
            has_prior_boundary: true,
            boundary,
        }
    }

    /// IMAP `UID SEARCH` criteria for this window.
    pub fn criteria(&self) -> String {
        if self.has_prior_boundary {
            format!("UNSEEN UID {}:*", self.boundary)
        } else {
            "UNSEEN".to_owned()
        }
    }

    /// Whether a search result lies entirely below the boundary.
    ///
    /// A `UID n:*` range always matches the highest UID in the mailbox,
    /// even when it is below `n`, so such results carry nothing new.
    pub fn is_stale(&self, uids: &[u32]) -> bool {
        match uids.iter().max() {
            Some(&max) => self.has_prior_boundary && max < self.boundary,
            None => false,
        }
    }
}

/// Tracks, per mailbox, the UID below which messages were already reported.
#[derive(Debug, Default)]
pub struct UnseenTracker {
    /// Boundaries keyed by the raw mailbox name.
    boundaries: HashMap<String, u32>,
}

impl UnseenTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the search window for the next scan of a mailbox.
    pub fn window_for(&self, mailbox: &str) -> Window {
        match self.boundaries.get(mailbox) {
            Some(&boundary) => Window::from_boundary(boundary),
            None => Window::unconstrained(),
        }
    }

    /// Record the next UID the server will assign in a mailbox.
    ///
    /// The boundary never moves backwards.
    pub fn advance(&mut self, mailbox: &str, next_uid: u32) {
        match self.boundaries.get_mut(mailbox) {
            Some(boundary) if next_uid < *boundary => {
                tracing::warn!(
                    imap_mailbox = %mailbox,
                    boundary = *boundary,
                    uid_next = next_uid,
                    "server reported a lower UIDNEXT, keeping the current boundary"
                );
            }
            Some(boundary) => *boundary = next_uid,
            None => {
                self.boundaries.insert(mailbox.to_owned(), next_uid);
            }
        }
    }

    /// The current boundary of a mailbox, if it was ever scanned.
    pub fn boundary(&self, mailbox: &str) -> Option<u32> {
        self.boundaries.get(mailbox).copied()
    }
}
