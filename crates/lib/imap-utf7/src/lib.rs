//! IMAP modified UTF-7 mailbox name codec (RFC 3501, section 5.1.3).

use std::borrow::Cow;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD;

/// Errors returned while decoding IMAP modified UTF-7.
#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum DecodeError {
    /// Encountered a non-ASCII character in the encoded input.
    #[error("non-ASCII character at byte offset {0}")]
    NonAscii(usize),

    /// A shifted region started with `&` but was never closed with `-`.
    #[error("unterminated shifted region at byte offset {0}")]
    Unterminated(usize),

    /// The shifted region is not valid base64.
    #[error("invalid base64 in shifted region at byte offset {at}: {source}")]
    Base64 {
        /// Offset of the `&` opening the region.
        at: usize,

        /// Underlying base64 error.
        #[source]
        source: base64::DecodeError,
    },

    /// The shifted region decoded to an odd number of bytes.
    #[error("odd UTF-16 byte count in shifted region at byte offset {0}")]
    OddLength(usize),

    /// The shifted region decoded to ill-formed UTF-16.
    #[error("invalid UTF-16 in shifted region at byte offset {0}")]
    InvalidUtf16(usize),
}

/// Decode an IMAP modified UTF-7 string into UTF-8.
pub fn decode(input: &str) -> Result<String, DecodeError> {
    if let Some((idx, _)) = input.char_indices().find(|(_, ch)| !ch.is_ascii()) {
        return Err(DecodeError::NonAscii(idx));
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    let mut offset = 0;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);

        let shifted = &rest[start + 1..];
        let end = shifted
            .find('-')
            .ok_or(DecodeError::Unterminated(offset + start))?;

        let region = &shifted[..end];
        if region.is_empty() {
            out.push('&');
        } else {
            out.push_str(&decode_region(region, offset + start)?);
        }

        let consumed = start + end + 2;
        rest = &rest[consumed..];
        offset += consumed;
    }

    out.push_str(rest);
    Ok(out)
}

/// Decode a mailbox name for display, falling back to the raw form.
///
/// Surrounding protocol quotes are stripped first.
pub fn decode_lossy(raw: &str) -> String {
    let unquoted = strip_quotes(raw);
    match decode(&unquoted) {
        Ok(decoded) => decoded,
        Err(error) => {
            tracing::warn!(mailbox = %raw, %error, "mailbox name is not valid modified UTF-7");
            unquoted.into_owned()
        }
    }
}

/// Remove protocol quoting from a mailbox name, if present.
pub fn strip_quotes(raw: &str) -> Cow<'_, str> {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return Cow::Borrowed(raw);
    };

    if !inner.contains('\\') {
        return Cow::Borrowed(inner);
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
                continue;
            }
        }
        out.push(ch);
    }
    Cow::Owned(out)
}

/// Encode a UTF-8 string into IMAP modified UTF-7.
pub fn encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending: Vec<u16> = Vec::new();

    for ch in input.chars() {
        if is_direct(ch) {
            flush_region(&mut pending, &mut out);
            out.push(ch);
        } else if ch == '&' {
            flush_region(&mut pending, &mut out);
            out.push_str("&-");
        } else {
            let mut units = [0u16; 2];
            pending.extend_from_slice(ch.encode_utf16(&mut units));
        }
    }

    flush_region(&mut pending, &mut out);
    out
}

/// Characters that are represented as themselves.
const fn is_direct(ch: char) -> bool {
    matches!(ch, ' '..='~') && ch != '&'
}

/// Decode a non-empty shifted region that starts at byte offset `at`.
fn decode_region(region: &str, at: usize) -> Result<String, DecodeError> {
    let standard = region.replace(',', "/");
    let bytes = STANDARD_NO_PAD
        .decode(standard.as_bytes())
        .map_err(|source| DecodeError::Base64 { at, source })?;

    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddLength(at));
    }

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();

    String::from_utf16(&units).map_err(|_| DecodeError::InvalidUtf16(at))
}

/// Write the pending UTF-16 units as a shifted region.
fn flush_region(pending: &mut Vec<u16>, out: &mut String) {
    if pending.is_empty() {
        return;
    }

    let bytes: Vec<u8> = pending.drain(..).flat_map(u16::to_be_bytes).collect();

    out.push('&');
    out.push_str(&STANDARD_NO_PAD.encode(bytes).replace('/', ","));
    out.push('-');
}
