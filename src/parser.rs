//! MIME decoding into [`ParsedEmail`]

use crate::error::{IngestError, Result};
use crate::html::extract_text;
use crate::types::{ParsedEmail, TrackedHeader};
use mailparse::body::Body;
use mailparse::{DispositionType, ParsedMail};
use tracing::{debug, warn};

/// Deepest chain of embedded `message/rfc822` parts that is expanded
const MAX_EMBEDDED_DEPTH: usize = 8;

const EMBEDDED_MESSAGE: &str = "message/rfc822";

/// One node of a parsed message: a leaf body or a multipart container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimePart {
    /// Header names with their raw, unfolded values, in order
    pub headers: Vec<(String, String)>,

    /// Lowercased mime type, e.g. `text/plain`
    pub content_type: String,

    /// Declared `charset` parameter, lowercased
    pub charset: Option<String>,

    /// Marked `Content-Disposition: attachment`
    pub is_attachment: bool,

    /// Body with the transfer encoding removed
    pub body: Vec<u8>,

    /// Decoded text of a leaf, `None` for opaque binary parts
    pub text: Option<String>,

    /// Subparts in document order; an inline `message/rfc822` part holds
    /// the embedded message as its only child
    pub children: Vec<Self>,
}

impl MimePart {
    /// Parse raw message bytes into an owned part tree
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let parsed =
            mailparse::parse_mail(raw).map_err(|e| IngestError::MalformedMessage(e.to_string()))?;
        Ok(Self::from_mail(&parsed, 0))
    }

    fn from_mail(mail: &ParsedMail, depth: usize) -> Self {
        let headers = mail
            .headers
            .iter()
            .map(|h| (h.get_key(), raw_header_value(h.get_value_raw())))
            .collect();

        let content_type = mail.ctype.mimetype.to_lowercase();
        let charset = mail
            .ctype
            .params
            .get("charset")
            .map(|c| c.to_lowercase());

        let is_attachment = matches!(
            mail.get_content_disposition().disposition,
            DispositionType::Attachment
        );

        let mut children: Vec<Self> = mail
            .subparts
            .iter()
            .map(|part| Self::from_mail(part, depth))
            .collect();

        let body = if children.is_empty() {
            transfer_decoded(mail)
        } else {
            Vec::new()
        };

        if children.is_empty() && content_type == EMBEDDED_MESSAGE && !is_attachment {
            if depth < MAX_EMBEDDED_DEPTH {
                match mailparse::parse_mail(&body) {
                    Ok(inner) => children.push(Self::from_mail(&inner, depth + 1)),
                    Err(e) => debug!("Keeping embedded message opaque: {e}"),
                }
            } else {
                debug!("Embedded messages nested deeper than {MAX_EMBEDDED_DEPTH}, not expanded");
            }
        }

        let text = if !children.is_empty() {
            None
        } else if charset.is_some() {
            Some(
                mail.get_body()
                    .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned()),
            )
        } else if content_type.starts_with("text/") {
            // Undeclared text is taken as UTF-8
            Some(String::from_utf8_lossy(&body).into_owned())
        } else {
            None
        };

        Self {
            headers,
            content_type,
            charset,
            is_attachment,
            body,
            text,
            children,
        }
    }

    /// Whether this part contains subparts
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        !self.children.is_empty() || self.content_type.starts_with("multipart/")
    }

    /// Leaf parts, depth-first in document order
    #[must_use]
    pub fn leaves(&self) -> Vec<&Self> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];

        while let Some(part) = stack.pop() {
            if part.children.is_empty() {
                leaves.push(part);
            } else {
                stack.extend(part.children.iter().rev());
            }
        }

        leaves
    }

    /// All values of a header, case-insensitive, in order
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Header value as written in the message, with folding line breaks removed
fn raw_header_value(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .split(['\r', '\n'])
        .collect::<String>()
        .trim()
        .to_string()
}

fn transfer_decoded(mail: &ParsedMail) -> Vec<u8> {
    mail.get_body_raw().unwrap_or_else(|e| {
        debug!("Transfer decoding failed, keeping encoded body: {e}");
        match mail.get_body_encoded() {
            Body::Base64(b) | Body::QuotedPrintable(b) => b.get_raw().to_vec(),
            Body::SevenBit(b) | Body::EightBit(b) => b.get_raw().to_vec(),
            Body::Binary(b) => b.get_raw().to_vec(),
        }
    })
}

/// What the walk has found for the plain-text body so far
#[derive(Debug, Default)]
enum BodyCandidate {
    #[default]
    Missing,
    /// Bytes of a part with no charset, never decoded as text
    Opaque(Vec<u8>),
    Text(String),
}

/// Decode raw message bytes, degrading to an empty record when the
/// message cannot be parsed at all
#[must_use]
pub fn decode(raw: &[u8]) -> ParsedEmail {
    try_decode(raw).unwrap_or_else(|e| {
        warn!("Returning empty email: {e}");
        ParsedEmail::default()
    })
}

/// Decode raw message bytes into a [`ParsedEmail`]
pub fn try_decode(raw: &[u8]) -> Result<ParsedEmail> {
    let root = MimePart::parse(raw)?;
    let email = decode_part_tree(&root);

    debug!(
        "Decoded email: {} subject(s), {} text bytes, {} html bytes",
        email.subject.len(),
        email.text.len(),
        email.html.len()
    );

    Ok(email)
}

/// Build a [`ParsedEmail`] from an already parsed part tree
#[must_use]
pub fn decode_part_tree(root: &MimePart) -> ParsedEmail {
    let mut email = ParsedEmail::default();

    for header in TrackedHeader::ALL {
        email
            .header_mut(header)
            .extend(root.header_values(header.name()).map(str::to_string));
    }

    let mut body = BodyCandidate::Missing;
    let mut html = String::new();

    // Attachments are only skipped inside a multipart tree
    let skip_attachments = root.is_multipart();

    for part in root.leaves() {
        if skip_attachments && part.is_attachment {
            continue;
        }

        let Some(text) = &part.text else {
            if !matches!(body, BodyCandidate::Text(_)) {
                body = BodyCandidate::Opaque(part.body.clone());
            }
            continue;
        };

        // Last part of each type wins
        match part.content_type.as_str() {
            "text/plain" => body = BodyCandidate::Text(text.clone()),
            "text/html" => html.clone_from(text),
            _ => {}
        }
    }

    email.text = match body {
        BodyCandidate::Text(text) => text.trim().to_string(),
        BodyCandidate::Opaque(bytes) if html.is_empty() => {
            debug!("Ignoring {} bytes of opaque body", bytes.len());
            String::new()
        }
        BodyCandidate::Missing | BodyCandidate::Opaque(_) => extract_text(&html).trim().to_string(),
    };
    email.html = html.trim().to_string();

    email
}
