//! Ingestion configuration

use crate::error::{IngestError, Result};
use crate::normalize::{DEFAULT_BOILERPLATE, Normalizer};
use serde::{Deserialize, Serialize};

/// Number of identifiers requested from the lister by default
pub const DEFAULT_MAX_RESULTS: usize = 40;

/// Messages fetched at once by the concurrent orchestrator
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Boilerplate removal settings
///
/// Configured patterns replace the default list rather than extend it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Regular expressions whose matches are removed
    pub boilerplate_patterns: Vec<String>,

    /// Exact strings that are removed
    pub boilerplate_literals: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            boilerplate_patterns: DEFAULT_BOILERPLATE.iter().map(ToString::to_string).collect(),
            boilerplate_literals: Vec::new(),
        }
    }
}

/// Top level configuration for a batch ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub normalizer: NormalizerConfig,

    /// Identifiers requested from the lister
    pub max_results: usize,

    /// Upper bound on in-flight fetches for concurrent ingestion
    pub concurrency: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            normalizer: NormalizerConfig::default(),
            max_results: DEFAULT_MAX_RESULTS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl IngestConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| IngestError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(source).map_err(|e| IngestError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the orchestrator cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(IngestError::Config("max_results must be at least 1".into()));
        }
        if self.concurrency == 0 {
            return Err(IngestError::Config("concurrency must be at least 1".into()));
        }
        Normalizer::new(&self.normalizer).map(|_| ())
    }
}
