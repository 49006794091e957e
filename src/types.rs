//! Core types for decoded and normalized emails

use crate::normalize::Normalizer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Headers collected from every message, in the order they are stored
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TrackedHeader {
    Subject,
    From,
    To,
    ReturnPath,
    DeliveredTo,
    Date,
}

impl TrackedHeader {
    /// All tracked headers
    pub const ALL: [Self; 6] = [
        Self::Subject,
        Self::From,
        Self::To,
        Self::ReturnPath,
        Self::DeliveredTo,
        Self::Date,
    ];

    /// Header name as it appears in a message
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Subject => "Subject",
            Self::From => "From",
            Self::To => "To",
            Self::ReturnPath => "Return-Path",
            Self::DeliveredTo => "Delivered-To",
            Self::Date => "Date",
        }
    }
}

impl fmt::Display for TrackedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded email, one per message in an ingestion pass
///
/// Every header list holds all occurrences of that header in message
/// order, as raw unfolded values (encoded-words are left as written, see
/// [`ParsedEmail::decoded`]). A header that does not occur yields an
/// empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEmail {
    pub(crate) text: String,
    pub(crate) html: String,
    pub(crate) subject: Vec<String>,
    pub(crate) from_sender: Vec<String>,
    pub(crate) to_recipient: Vec<String>,
    pub(crate) return_path: Vec<String>,
    pub(crate) delivered_to: Vec<String>,
    pub(crate) datetime: Vec<String>,
}

impl ParsedEmail {
    /// Best-effort plain text body, empty if none could be derived
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Raw HTML body, empty if the message has no HTML part
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    #[must_use]
    pub fn subject(&self) -> &[String] {
        &self.subject
    }

    #[must_use]
    pub fn from_sender(&self) -> &[String] {
        &self.from_sender
    }

    #[must_use]
    pub fn to_recipient(&self) -> &[String] {
        &self.to_recipient
    }

    #[must_use]
    pub fn return_path(&self) -> &[String] {
        &self.return_path
    }

    #[must_use]
    pub fn delivered_to(&self) -> &[String] {
        &self.delivered_to
    }

    #[must_use]
    pub fn datetime(&self) -> &[String] {
        &self.datetime
    }

    /// Values collected for a tracked header
    #[must_use]
    pub fn header(&self, header: TrackedHeader) -> &[String] {
        match header {
            TrackedHeader::Subject => &self.subject,
            TrackedHeader::From => &self.from_sender,
            TrackedHeader::To => &self.to_recipient,
            TrackedHeader::ReturnPath => &self.return_path,
            TrackedHeader::DeliveredTo => &self.delivered_to,
            TrackedHeader::Date => &self.datetime,
        }
    }

    /// Values of a tracked header with RFC 2047 encoded-words decoded
    #[must_use]
    pub fn decoded(&self, header: TrackedHeader) -> Vec<String> {
        self.header(header)
            .iter()
            .map(|raw| {
                let line = format!("{}: {raw}", header.name());
                mailparse::parse_header(line.as_bytes())
                    .map_or_else(|_| raw.clone(), |(parsed, _)| parsed.get_value())
            })
            .collect()
    }

    /// `Date` values that parse as RFC 2822 timestamps, in header order
    #[must_use]
    pub fn dates(&self) -> Vec<DateTime<Utc>> {
        self.datetime
            .iter()
            .filter_map(|d| DateTime::parse_from_rfc2822(d.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .collect()
    }

    /// True when neither a text nor an HTML body was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.html.is_empty()
    }

    pub(crate) fn header_mut(&mut self, header: TrackedHeader) -> &mut Vec<String> {
        match header {
            TrackedHeader::Subject => &mut self.subject,
            TrackedHeader::From => &mut self.from_sender,
            TrackedHeader::To => &mut self.to_recipient,
            TrackedHeader::ReturnPath => &mut self.return_path,
            TrackedHeader::DeliveredTo => &mut self.delivered_to,
            TrackedHeader::Date => &mut self.datetime,
        }
    }
}

/// A [`ParsedEmail`] whose text has been normalized for classification
///
/// The HTML body and headers are carried over untouched. Only
/// serialization is offered: a normalized record is always built through
/// [`NormalizedEmail::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedEmail(ParsedEmail);

impl NormalizedEmail {
    /// Normalize the text of a parsed email
    #[must_use]
    pub fn new(parsed: ParsedEmail, normalizer: &Normalizer) -> Self {
        let text = normalizer.normalize(&parsed.text);
        Self(ParsedEmail { text, ..parsed })
    }

    #[must_use]
    pub fn into_inner(self) -> ParsedEmail {
        self.0
    }
}

impl Deref for NormalizedEmail {
    type Target = ParsedEmail;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<ParsedEmail> for NormalizedEmail {
    fn from(parsed: ParsedEmail) -> Self {
        Self::new(parsed, Normalizer::shared())
    }
}
