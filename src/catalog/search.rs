//! Free-text search against the catalog's search surface.
//!
//! The catalog only exposes search as a rendered results page. Each result
//! card carries a display title and a link whose final path segment is the
//! internal slug; that pair is all the resolver needs to score candidates.

use anyhow::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};

/// A single search hit considered during dynamic resolution.
///
/// Ephemeral: produced per search, never retained beyond one resolution
/// attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMatch {
    /// Display title as rendered on the result card.
    pub title: String,
    /// Internal catalog slug derived from the card's link.
    pub internal_id: String,
}

/// Async trait for the catalog's search surface.
///
/// The concrete implementation is [`CatalogClient`](super::CatalogClient);
/// the resolver depends on this seam so it can be exercised with stub
/// catalogs in tests.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Search the catalog and return candidates in the order the catalog
    /// ranked them. Transport and parse failures surface as errors; the
    /// caller decides whether they are fatal.
    async fn search(&self, term: &str) -> Result<Vec<CandidateMatch>>;
}

/// Extract candidate matches from a rendered search results document.
///
/// Items missing a title or a usable link are dropped; result order is
/// preserved (the catalog ranks by its own relevance).
pub fn extract_candidates(document: &str) -> Vec<CandidateMatch> {
    let document = Html::parse_document(document);
    let item_selector = Selector::parse(".film_list-wrap .flw-item").unwrap();
    let title_selector = Selector::parse(".film-detail .film-name a").unwrap();

    let mut candidates = Vec::new();
    for item in document.select(&item_selector) {
        let Some(anchor) = item.select(&title_selector).next() else {
            continue;
        };

        let title = anchor.text().collect::<String>().trim().to_string();
        let internal_id = anchor
            .value()
            .attr("href")
            .map(slug_from_href)
            .unwrap_or_default();

        if title.is_empty() || internal_id.is_empty() {
            continue;
        }

        candidates.push(CandidateMatch { title, internal_id });
    }
    candidates
}

/// Derive the internal slug from a result link: the final path segment,
/// with any query string or fragment stripped.
fn slug_from_href(href: &str) -> String {
    let path = href
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    path.rsplit('/').next().unwrap_or_default().to_string()
}
