//! Helpers for fetch collaborators working with the Gmail API

use crate::error::{IngestError, Result};
use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};

/// Decode the base64url `raw` field of a Gmail message into MIME bytes
///
/// Gmail omits padding on some responses, so both forms are accepted.
/// Embedded line breaks are ignored.
pub fn decode_raw_payload(raw: &str) -> Result<Vec<u8>> {
    let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let decoded = if compact.ends_with('=') {
        URL_SAFE.decode(compact.as_bytes())
    } else {
        URL_SAFE_NO_PAD.decode(compact.as_bytes())
    };

    decoded.map_err(|e| IngestError::Transport(e.to_string()))
}
