// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Gmail Message Ingestion
//!
//! Turns raw MIME messages into decoded, normalized records ready for a
//! spam classifier.
//!
//! # Pipeline
//!
//! - MIME decoding with last-wins plain text and HTML bodies
//! - HTML fallback when a message has no plain text part
//! - Text normalization (tag stripping, boilerplate removal, whitespace
//!   collapse, lowercasing)
//! - Ordered batch ingestion with per-message error slots
//!
//! # Example
//!
//! ```rust
//! use spam_ingest::{decode, normalize};
//!
//! let raw = b"From: sender@example.com\r\nSubject: Hello\r\n\r\nHello   World";
//! let email = decode(raw);
//!
//! assert_eq!(email.subject(), ["Hello"]);
//! assert_eq!(normalize(email.text()), "hello world");
//! ```

mod config;
mod error;
mod html;
mod ingest;
mod normalize;
mod parser;
mod transport;
mod types;

pub use config::*;
pub use error::{BoxError, ErrorMarker, IngestError, Result};
pub use html::{extract_text, strip_markup};
pub use ingest::{IngestOutcome, IngestSummary, Ingestor, ingest};
pub use normalize::{DEFAULT_BOILERPLATE, Normalizer, normalize};
pub use parser::{MimePart, decode, decode_part_tree, try_decode};
pub use transport::decode_raw_payload;
pub use types::*;
