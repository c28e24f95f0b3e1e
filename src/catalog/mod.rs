//! Internal catalog HTTP adapter.
//!
//! Wraps the streaming catalog's public surfaces: the free-text search page,
//! the ajax episode-listing endpoint, and the title detail page. The catalog
//! exposes no structured API for these, so responses are rendered HTML (or a
//! JSON envelope around an HTML fragment) and structural selectors pull out
//! the fields this service needs.
//!
//! # Module layout
//!
//! - [`search`] -- Free-text search returning candidate (title, id) pairs.
//! - [`episodes`] -- Episode-listing extraction and the normalized episode
//!   collection.

pub mod episodes;
pub mod search;

pub use episodes::{EpisodeCollection, EpisodeExtractor, EpisodeRecord};
pub use search::{CandidateMatch, CatalogSearch};

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON envelope returned by the ajax episode-listing endpoint.
#[derive(Debug, Deserialize)]
struct FragmentEnvelope {
    html: Option<String>,
}

/// HTTP client for the internal catalog site.
///
/// Holds a connection-pooled [`reqwest::Client`] with a bounded per-call
/// timeout so an unresponsive catalog cannot stall a resolution
/// indefinitely.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a client against the catalog's base URL (no trailing slash
    /// required).
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(CONNECTION_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Issue a free-text search and return the raw results document.
    pub(crate) async fn fetch_search_page(&self, term: &str) -> Result<String> {
        let url = format!("{}/search", self.base_url);
        debug!(term, "catalog search");

        let response = self
            .client
            .get(&url)
            .query(&[("keyword", term)])
            .send()
            .await
            .with_context(|| format!("catalog search request failed: {term}"))?
            .error_for_status()
            .with_context(|| format!("catalog search returned error for: {term}"))?;

        response
            .text()
            .await
            .context("failed to read catalog search response body")
    }

    /// Fetch the episode-listing HTML fragment for a show-level id.
    ///
    /// Returns `Ok(None)` when the catalog has no listing for the id
    /// (HTTP 404 or an envelope without a fragment).
    pub(crate) async fn fetch_episode_fragment(&self, show_id: &str) -> Result<Option<String>> {
        let url = format!("{}/ajax/v2/episode/list/{show_id}", self.base_url);
        debug!(show_id, "catalog episode listing");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("episode listing request failed: {show_id}"))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let envelope: FragmentEnvelope = response
            .error_for_status()
            .with_context(|| format!("episode listing returned error for: {show_id}"))?
            .json()
            .await
            .context("failed to parse episode listing envelope")?;

        Ok(envelope.html)
    }

    /// Fetch the title detail page for an internal id.
    pub(crate) async fn fetch_detail_page(&self, internal_id: &str) -> Result<String> {
        let url = format!("{}/{internal_id}", self.base_url);
        debug!(internal_id, "catalog detail page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("detail page request failed: {internal_id}"))?
            .error_for_status()
            .with_context(|| format!("detail page returned error for: {internal_id}"))?;

        response
            .text()
            .await
            .context("failed to read detail page body")
    }
}

#[async_trait]
impl CatalogSearch for CatalogClient {
    async fn search(&self, term: &str) -> Result<Vec<CandidateMatch>> {
        let body = self.fetch_search_page(term).await?;
        Ok(search::extract_candidates(&body))
    }
}
