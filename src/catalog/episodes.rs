//! Episode-listing extraction.
//!
//! The catalog serves episode listings as an HTML fragment wrapped in a JSON
//! envelope, keyed by a show-level numeric id (the trailing segment of the
//! slug). The extractor turns that fragment into a normalized
//! [`EpisodeCollection`], and can best-effort recover the external metadata
//! id embedded in the title's detail page for lookups that bypassed the
//! resolver.

use std::sync::Arc;

use anyhow::Result;
use scraper::{Html, Selector};
use serde::Serialize;
use tracing::warn;

use super::CatalogClient;

/// A single episode parsed from the listing fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    /// Episode number as declared by the catalog.
    pub episode_number: u32,
    /// Catalog-internal identifier for the episode.
    pub episode_id: String,
    /// Localized display title, when the catalog has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Native-language title, when the catalog has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_title: Option<String>,
    /// Whether the catalog flags this episode as filler.
    pub is_filler: bool,
}

/// Normalized episode listing for one title.
///
/// `total_episodes` is always the count of parsed episodes, never a
/// separately-declared total from the source document, so it cannot disagree
/// with the list. Episodes are ordered by ascending episode number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeCollection {
    pub total_episodes: usize,
    pub episodes: Vec<EpisodeRecord>,
    /// External metadata id, when known from resolution or recovered from
    /// the detail page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<u64>,
}

impl EpisodeCollection {
    /// Build a collection from parsed records, sorting by episode number.
    pub fn from_records(mut episodes: Vec<EpisodeRecord>, external_id: Option<u64>) -> Self {
        episodes.sort_by_key(|e| e.episode_number);
        Self {
            total_episodes: episodes.len(),
            episodes,
            external_id,
        }
    }

    /// An empty listing. "Zero episodes" and "no listing found" are
    /// indistinguishable at this layer.
    pub fn empty(external_id: Option<u64>) -> Self {
        Self {
            total_episodes: 0,
            episodes: Vec::new(),
            external_id,
        }
    }
}

/// Extracts normalized episode listings from the catalog.
#[derive(Debug, Clone)]
pub struct EpisodeExtractor {
    catalog: Arc<CatalogClient>,
}

impl EpisodeExtractor {
    pub fn new(catalog: Arc<CatalogClient>) -> Self {
        Self { catalog }
    }

    /// Fetch and normalize the episode listing for an internal id.
    ///
    /// `known_external` carries the external id when resolution already
    /// produced it; otherwise the title's detail page is fetched best-effort
    /// to recover it, and failures leave it unset. An absent or empty
    /// listing yields an empty collection, not an error.
    pub async fn extract(
        &self,
        internal_id: &str,
        known_external: Option<u64>,
    ) -> Result<EpisodeCollection> {
        let show_id = show_id(internal_id);

        let Some(fragment) = self.catalog.fetch_episode_fragment(show_id).await? else {
            return Ok(EpisodeCollection::empty(known_external));
        };

        let episodes = parse_episode_fragment(&fragment);
        if episodes.is_empty() {
            return Ok(EpisodeCollection::empty(known_external));
        }

        let external_id = match known_external {
            Some(id) => Some(id),
            None => self.recover_external_id(internal_id).await,
        };

        Ok(EpisodeCollection::from_records(episodes, external_id))
    }

    /// Best-effort recovery of the external id from the detail page's
    /// embedded sync-metadata block.
    async fn recover_external_id(&self, internal_id: &str) -> Option<u64> {
        match self.catalog.fetch_detail_page(internal_id).await {
            Ok(page) => parse_sync_external_id(&page),
            Err(e) => {
                warn!(internal_id, error = %e, "could not fetch detail page for external id");
                None
            }
        }
    }
}

/// Show-level identifier: the segment after the last `-` of the slug.
fn show_id(internal_id: &str) -> &str {
    internal_id.rsplit('-').next().unwrap_or(internal_id)
}

/// Parse the episode-listing fragment into records.
///
/// Items missing a parseable episode number or an id are dropped.
fn parse_episode_fragment(fragment: &str) -> Vec<EpisodeRecord> {
    let document = Html::parse_fragment(fragment);
    let item_selector = Selector::parse(".ss-list a.ssl-item.ep-item").unwrap();
    let name_selector = Selector::parse(".ep-name").unwrap();

    let mut episodes = Vec::new();
    for item in document.select(&item_selector) {
        let Some(episode_number) = item
            .value()
            .attr("data-number")
            .and_then(|n| n.trim().parse::<u32>().ok())
        else {
            continue;
        };
        let Some(episode_id) = item
            .value()
            .attr("data-id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
        else {
            continue;
        };

        let name = item.select(&name_selector).next();
        let title = name
            .map(|n| n.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| item.value().attr("title").map(str::to_string));
        let native_title = name
            .and_then(|n| n.value().attr("data-jname"))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let is_filler = item.value().classes().any(|c| c == "ssl-item-filler");

        episodes.push(EpisodeRecord {
            episode_number,
            episode_id: episode_id.to_string(),
            title,
            native_title,
            is_filler,
        });
    }
    episodes
}

/// Pull the external id out of the detail page's sync-metadata JSON block.
fn parse_sync_external_id(page: &str) -> Option<u64> {
    let document = Html::parse_document(page);
    let selector = Selector::parse("script#syncData").unwrap();
    let script = document.select(&selector).next()?;
    let json: serde_json::Value = serde_json::from_str(&script.inner_html()).ok()?;

    match &json["mal_id"] {
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Number(n) => n.as_u64(),
        _ => None,
    }
}
