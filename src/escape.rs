//! Percent-encoding for payloads embedded in flat text.
//!
//! Code blocks and image captions are stored inside a `{...}` argument, so
//! their braces and newlines must not appear literally. The encoding is the
//! same one browsers produce with `encodeURIComponent`, which keeps files
//! written by the web editor readable here and vice versa.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{Error, Result};

/// Characters left untouched by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a payload.
pub fn encode(text: &str) -> String {
    utf8_percent_encode(text, COMPONENT).to_string()
}

/// Decode a percent-encoded payload.
///
/// Fails on a `%` not followed by two hex digits and on byte sequences that
/// are not valid UTF-8.
pub fn decode(encoded: &str) -> Result<String> {
    let bytes = encoded.as_bytes();
    let mut i = 0;
    while let Some(offset) = bytes[i..].iter().position(|&b| b == b'%') {
        let at = i + offset;
        let valid = bytes
            .get(at + 1..at + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            return Err(Error::Decode(format!(
                "malformed escape at byte {} in \"{}\"",
                at,
                preview(encoded)
            )));
        }
        i = at + 3;
    }

    percent_decode_str(encoded)
        .decode_utf8()
        .map(|text| text.into_owned())
        .map_err(|e| Error::Decode(format!("invalid UTF-8 in payload: {}", e)))
}

fn preview(text: &str) -> String {
    const MAX: usize = 24;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
