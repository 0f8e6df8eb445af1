//! Mailbox exclusion rules.

use std::collections::HashSet;

use transport_core::MailboxDescriptor;

/// Attribute flags that make a mailbox impossible to select.
const NON_SELECTABLE: [&str; 2] = ["\\Noselect", "\\NonExistent"];

/// Configured mailbox exclusions.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Exclusions {
    /// Decoded mailbox names to skip.
    pub names: HashSet<String>,

    /// Attribute flags that cause a mailbox to be skipped.
    pub flags: HashSet<String>,
}

impl Exclusions {
    /// Build exclusions from name and flag lists.
    pub fn new<N, F>(names: N, flags: F) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            flags: flags.into_iter().map(Into::into).collect(),
        }
    }
}

/// The filter verdict for a mailbox.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Decision {
    /// The mailbox is scanned.
    Scan,

    /// One of the mailbox flags is excluded by configuration.
    ExcludedFlag(String),

    /// The mailbox cannot be selected.
    NonSelectable,

    /// The decoded mailbox name is excluded by configuration.
    ExcludedName(String),
}

impl Decision {
    /// Whether the mailbox is skipped.
    pub const fn is_excluded(&self) -> bool {
        !matches!(self, Self::Scan)
    }
}

/// Decide whether a mailbox is scanned, and why not.
pub fn decide(mailbox: &MailboxDescriptor, exclusions: &Exclusions) -> Decision {
    let excluded_flag = mailbox.flags.iter().find(|flag| {
        exclusions
            .flags
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(flag))
    });
    if let Some(flag) = excluded_flag {
        return Decision::ExcludedFlag(flag.clone());
    }

    if NON_SELECTABLE.iter().any(|marker| mailbox.has_flag(marker)) {
        return Decision::NonSelectable;
    }

    let name = imap_utf7::decode_lossy(&mailbox.name);
    if exclusions.names.contains(&name) {
        return Decision::ExcludedName(name);
    }

    Decision::Scan
}

/// Whether a mailbox must be skipped.
pub fn is_excluded(mailbox: &MailboxDescriptor, exclusions: &Exclusions) -> bool {
    decide(mailbox, exclusions).is_excluded()
}
