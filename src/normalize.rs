//! Text canonicalization for classifier input

use crate::config::NormalizerConfig;
use crate::error::{IngestError, Result};
use crate::html::strip_markup;
use regex::Regex;
use std::sync::LazyLock;

/// Boilerplate stripped when no other patterns are configured
pub const DEFAULT_BOILERPLATE: &[&str] = &[r"\[image: Google\]"];

/// Upper bound on normalization passes and on boilerplate rounds per pass
const MAX_PASSES: usize = 4;

static CRLF_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r\n+").unwrap());

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static DEFAULT_NORMALIZER: LazyLock<Normalizer> = LazyLock::new(|| Normalizer {
    boilerplate: DEFAULT_BOILERPLATE
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect(),
});

/// Normalize text with the default boilerplate list
#[must_use]
pub fn normalize(text: &str) -> String {
    DEFAULT_NORMALIZER.normalize(text)
}

/// Canonicalizes extracted text: tag stripping, boilerplate removal,
/// whitespace collapse and lowercasing
#[derive(Debug, Clone)]
pub struct Normalizer {
    boilerplate: Vec<Regex>,
}

impl Normalizer {
    /// Build a normalizer from configuration
    pub fn new(config: &NormalizerConfig) -> Result<Self> {
        let literals = config.boilerplate_literals.iter().map(|l| regex::escape(l));
        let patterns = config.boilerplate_patterns.iter().cloned();
        Self::with_patterns(patterns.chain(literals))
    }

    /// Build a normalizer stripping the given regex patterns
    pub fn with_patterns<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let boilerplate = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|source| IngestError::Pattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { boilerplate })
    }

    /// The process-wide default normalizer
    #[must_use]
    pub fn shared() -> &'static Self {
        &DEFAULT_NORMALIZER
    }

    /// Normalize text; applying this twice gives the same result as once
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        self.normalize_counted(text).0
    }

    /// Normalized text and the number of passes it took
    ///
    /// A single pass is already stable unless boilerplate removal or
    /// lowercasing forms new markup, so passes are capped at
    /// [`MAX_PASSES`].
    fn normalize_counted(&self, text: &str) -> (String, usize) {
        let mut current = self.pass(text);
        let mut passes = 1;

        while passes < MAX_PASSES {
            let next = self.pass(&current);
            passes += 1;
            if next == current {
                break;
            }
            current = next;
        }

        (current, passes)
    }

    fn pass(&self, text: &str) -> String {
        let mut text = strip_markup(text);

        // Removing one marker can splice together another
        for pattern in &self.boilerplate {
            for _ in 0..MAX_PASSES {
                let stripped = pattern.replace_all(&text, "");
                if stripped.len() == text.len() {
                    break;
                }
                text = stripped.into_owned();
            }
        }

        let text = CRLF_RUN_REGEX.replace_all(&text, "\n");
        let text = WHITESPACE_REGEX.replace_all(&text, " ");

        text.trim().to_lowercase()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        DEFAULT_NORMALIZER.clone()
    }
}
