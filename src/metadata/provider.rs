//! Trait definition and types for external title metadata sources.
//!
//! This module defines the [`TitleProvider`] trait implemented by metadata
//! backends (Jikan today), along with the [`TitleRecord`] returned by a
//! lookup.

use async_trait::async_trait;

/// Canonical title data for an externally-catalogued anime.
///
/// Read-only once fetched. A record always carries at least one title;
/// providers report an id with no usable titles as absent rather than
/// returning an empty record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleRecord {
    /// Canonical titles in preference order: the default localized title
    /// first, then the secondary (English) title when it differs.
    pub titles: Vec<String>,
    /// Alternate titles and abbreviations.
    pub synonyms: Vec<String>,
}

impl TitleRecord {
    /// Ordered candidate query terms for catalog search: canonical titles
    /// first, then each synonym. Later terms are only worth trying when
    /// earlier ones yield no acceptable match.
    pub fn query_terms(&self) -> impl Iterator<Item = &str> {
        self.titles
            .iter()
            .chain(self.synonyms.iter())
            .map(String::as_str)
    }
}

/// Async trait for services that resolve an external numeric id to its
/// canonical title data.
///
/// Implementations are expected to be cheaply shareable behind an `Arc`.
#[async_trait]
pub trait TitleProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"jikan"`).
    fn name(&self) -> &'static str;

    /// Fetch canonical titles and synonyms for `external_id`.
    ///
    /// Returns `Ok(None)` when the service has no record for the id; an
    /// empty or absent payload is absence, never an empty [`TitleRecord`].
    async fn fetch_title_record(&self, external_id: u64) -> anyhow::Result<Option<TitleRecord>>;
}
