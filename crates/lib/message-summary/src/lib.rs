//! Sender and subject extraction from raw message headers.

use mailparse::MailHeaderMap as _;

/// Errors returned while reading a header block.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The header block could not be parsed.
    #[error("malformed header block: {0}")]
    Headers(#[source] mailparse::MailParseError),
}

/// The decoded parts of a message needed for a notification.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct MessageSummary {
    /// Decoded `From` header, empty when missing.
    pub from: String,

    /// Decoded `Subject` header, empty when missing.
    pub subject: String,
}

impl MessageSummary {
    /// Parse a raw header block, decoding RFC 2047 encoded words.
    pub fn from_header_bytes(raw: &[u8]) -> Result<Self, ParseError> {
        let (headers, _) = mailparse::parse_headers(raw).map_err(ParseError::Headers)?;

        Ok(Self {
            from: headers.get_first_value("From").unwrap_or_default(),
            subject: headers.get_first_value("Subject").unwrap_or_default(),
        })
    }
}
