//! Layered identity resolution.
//!
//! Resolves an external metadata id onto the catalog's slug scheme through
//! three layers, short-circuiting on the first hit: the static table, the
//! process-wide cache, then dynamic resolution (fetch canonical titles,
//! search the catalog per query term, score candidates, cache the winner).
//!
//! Transport and parse failures inside the dynamic loop are absorbed as "no
//! results for that term"; only exhaustion surfaces to the caller.

pub mod store;

pub use store::{InMemoryMappingStore, MappingStore, StaticTable};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::{CandidateMatch, CatalogSearch};
use crate::matching;
use crate::metadata::TitleProvider;

/// Numeric id in the external metadata service's scheme.
pub type ExternalId = u64;
/// Slug in the internal catalog's scheme.
pub type InternalId = String;

/// Resolution failures that surface to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The metadata service has no usable record for the id (or could not
    /// be reached), so there is nothing to search with.
    #[error("metadata service has no record for external id {0}")]
    Unavailable(ExternalId),

    /// Every query term was exhausted without an acceptable match.
    #[error("no catalog match found for external id {id}")]
    NotFound {
        id: ExternalId,
        /// Primary title from the metadata record, so callers can build a
        /// friendlier message without a second fetch.
        title: Option<String>,
    },
}

/// Tunables for the resolver's decision policy.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Minimum similarity a candidate must exceed to be accepted.
    pub match_threshold: f64,
    /// When no term clears the threshold, accept the first candidate of the
    /// first non-empty result set. Trades precision for recall; off by
    /// default.
    pub first_result_fallback: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            match_threshold: 0.7,
            first_result_fallback: false,
        }
    }
}

/// The layered identity resolver.
///
/// Owns the decision policy and the mapping stores; metadata lookup and
/// catalog search are injected behind their traits.
pub struct Resolver {
    provider: Arc<dyn TitleProvider>,
    catalog: Arc<dyn CatalogSearch>,
    static_table: StaticTable,
    cache: Arc<dyn MappingStore>,
    options: ResolverOptions,
}

impl Resolver {
    pub fn new(
        provider: Arc<dyn TitleProvider>,
        catalog: Arc<dyn CatalogSearch>,
        static_table: StaticTable,
        cache: Arc<dyn MappingStore>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            provider,
            catalog,
            static_table,
            cache,
            options,
        }
    }

    /// Resolve an external id to the catalog's internal id.
    ///
    /// Static table and cache hits make no network calls. A successful
    /// dynamic resolution writes through to the cache; the static table is
    /// never mutated.
    pub async fn resolve(&self, external_id: ExternalId) -> Result<InternalId, ResolveError> {
        if let Some(hit) = self.static_table.get(external_id) {
            debug!(external_id, internal_id = hit, "static table hit");
            return Ok(hit.to_string());
        }

        if let Some(hit) = self.cache.get(external_id) {
            debug!(external_id, internal_id = %hit, "cache hit");
            return Ok(hit);
        }

        let record = match self.provider.fetch_title_record(external_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return Err(ResolveError::Unavailable(external_id)),
            Err(e) => {
                warn!(external_id, error = %e, "metadata fetch failed");
                return Err(ResolveError::Unavailable(external_id));
            }
        };

        // First candidate of the first non-empty result set, kept in case
        // no term clears the threshold and the fallback is enabled.
        let mut first_candidate: Option<CandidateMatch> = None;

        for term in record.query_terms() {
            let candidates = match self.catalog.search(term).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(term, error = %e, "catalog search failed, skipping term");
                    continue;
                }
            };
            if candidates.is_empty() {
                debug!(term, "no candidates for term");
                continue;
            }
            if first_candidate.is_none() {
                first_candidate = Some(candidates[0].clone());
            }

            if let Some(accepted) = self.select(&candidates, term, &record.synonyms) {
                info!(
                    external_id,
                    internal_id = %accepted.internal_id,
                    term,
                    "resolved dynamically"
                );
                self.cache
                    .insert(external_id, accepted.internal_id.clone());
                return Ok(accepted.internal_id);
            }
        }

        if self.options.first_result_fallback {
            if let Some(candidate) = first_candidate {
                warn!(
                    external_id,
                    internal_id = %candidate.internal_id,
                    "no candidate cleared the threshold, using first search result"
                );
                self.cache
                    .insert(external_id, candidate.internal_id.clone());
                return Ok(candidate.internal_id);
            }
        }

        Err(ResolveError::NotFound {
            id: external_id,
            title: record.titles.first().cloned(),
        })
    }

    /// Highest-scoring candidate strictly above the acceptance threshold,
    /// or `None` when nothing clears it.
    fn select(
        &self,
        candidates: &[CandidateMatch],
        query: &str,
        synonyms: &[String],
    ) -> Option<CandidateMatch> {
        let mut best: Option<(f64, &CandidateMatch)> = None;
        for candidate in candidates {
            let score = matching::score(&candidate.title, query, synonyms);
            if score <= self.options.match_threshold {
                continue;
            }
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, candidate));
            }
        }
        best.map(|(_, candidate)| candidate.clone())
    }
}
