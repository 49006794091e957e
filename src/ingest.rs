//! Batch ingestion: fetch, decode and normalize messages in order

use crate::config::{DEFAULT_CONCURRENCY, DEFAULT_MAX_RESULTS, IngestConfig};
use crate::error::{BoxError, ErrorMarker, IngestError, Result};
use crate::normalize::Normalizer;
use crate::parser::decode;
use crate::types::NormalizedEmail;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{info, warn};

/// Result slot for one message identifier
pub type IngestOutcome = std::result::Result<NormalizedEmail, ErrorMarker>;

/// Ingest messages with the default normalizer
///
/// Returns one outcome per identifier, in input order. A failed fetch
/// becomes an [`ErrorMarker`] in its slot and the batch continues.
pub fn ingest<I, S, F, E>(message_ids: I, fetch_raw: F) -> Vec<IngestOutcome>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnMut(&str) -> std::result::Result<Vec<u8>, E>,
    E: Into<BoxError>,
{
    Ingestor::default().ingest(message_ids, fetch_raw)
}

/// Counts of a finished batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl IngestSummary {
    #[must_use]
    pub fn from_outcomes(outcomes: &[IngestOutcome]) -> Self {
        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        Self {
            total: outcomes.len(),
            succeeded: outcomes.len() - failed,
            failed,
        }
    }
}

/// Batch orchestrator holding the normalizer and batch limits
#[derive(Debug, Clone)]
pub struct Ingestor {
    normalizer: Normalizer,
    max_results: usize,
    concurrency: usize,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self {
            normalizer: Normalizer::default(),
            max_results: DEFAULT_MAX_RESULTS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl Ingestor {
    /// Build an orchestrator from validated configuration
    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: Normalizer::new(&config.normalizer)?,
            max_results: config.max_results,
            concurrency: config.concurrency,
        })
    }

    #[must_use]
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    #[must_use]
    pub const fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Fetch, decode and normalize each identifier in order
    pub fn ingest<I, S, F, E>(&self, message_ids: I, mut fetch_raw: F) -> Vec<IngestOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(&str) -> std::result::Result<Vec<u8>, E>,
        E: Into<BoxError>,
    {
        let outcomes: Vec<IngestOutcome> = message_ids
            .into_iter()
            .map(|id| {
                let id = id.as_ref();
                self.finish(id, fetch_raw(id))
            })
            .collect();

        log_summary(&outcomes);
        outcomes
    }

    /// List identifiers, then ingest them
    ///
    /// The lister receives the configured maximum number of results. A
    /// listing failure aborts the whole call; per-message failures do not.
    pub fn ingest_listed<L, LE, F, E>(
        &self,
        list_message_ids: L,
        fetch_raw: F,
    ) -> Result<Vec<IngestOutcome>>
    where
        L: FnOnce(usize) -> std::result::Result<Vec<String>, LE>,
        LE: Into<BoxError>,
        F: FnMut(&str) -> std::result::Result<Vec<u8>, E>,
        E: Into<BoxError>,
    {
        let ids = list_message_ids(self.max_results).map_err(|e| IngestError::Listing(e.into()))?;
        Ok(self.ingest(ids, fetch_raw))
    }

    /// Ingest with up to `concurrency` fetches in flight
    ///
    /// Results are reassembled in input order regardless of which fetch
    /// completes first.
    pub async fn ingest_concurrent<I, F, Fut, E>(
        &self,
        message_ids: I,
        fetch: F,
    ) -> Vec<IngestOutcome>
    where
        I: IntoIterator<Item = String>,
        F: Fn(String) -> Fut,
        Fut: Future<Output = std::result::Result<Vec<u8>, E>>,
        E: Into<BoxError>,
    {
        let outcomes: Vec<IngestOutcome> = stream::iter(message_ids)
            .map(|id| {
                let pending = fetch(id.clone());
                async move { (id, pending.await) }
            })
            .buffered(self.concurrency)
            .map(|(id, fetched)| self.finish(&id, fetched))
            .collect()
            .await;

        log_summary(&outcomes);
        outcomes
    }

    fn finish<E>(&self, id: &str, fetched: std::result::Result<Vec<u8>, E>) -> IngestOutcome
    where
        E: Into<BoxError>,
    {
        match fetched {
            Ok(raw) => Ok(NormalizedEmail::new(decode(&raw), &self.normalizer)),
            Err(e) => {
                let cause: BoxError = e.into();
                warn!(message_id = id, "Fetch failed: {cause}");
                Err(ErrorMarker::new(id, cause))
            }
        }
    }
}

fn log_summary(outcomes: &[IngestOutcome]) {
    let summary = IngestSummary::from_outcomes(outcomes);
    info!(
        total = summary.total,
        failed = summary.failed,
        "Ingested {} of {} messages",
        summary.succeeded,
        summary.total
    );
}
