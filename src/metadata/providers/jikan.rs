//! Jikan (MyAnimeList mirror) title metadata provider.
//!
//! Implements [`TitleProvider`] by querying the Jikan v4 REST API.
//!
//! Features:
//! - Token-bucket rate limiting at 3 requests / second via [`governor`].
//! - Automatic retry on HTTP 429 with `Retry-After` header support (max 3 retries).
//! - 15-second request timeout.
//! - Unknown ids (HTTP 404) and empty payloads surface as absence, not errors.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::metadata::provider::{TitleProvider, TitleRecord};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_RETRIES: u32 = 3;

// ---------------------------------------------------------------------------
// Jikan API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct JikanEnvelope {
    data: Option<JikanAnime>,
}

#[derive(Debug, Deserialize)]
struct JikanAnime {
    title: Option<String>,
    title_english: Option<String>,
    #[serde(default)]
    title_synonyms: Vec<String>,
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// Jikan title metadata provider.
///
/// Wraps the Jikan v4 REST API with built-in rate limiting and retry logic.
pub struct JikanProvider {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl JikanProvider {
    /// Create a new Jikan provider against the given API base URL
    /// (e.g. `https://api.jikan.moe/v4`). Rate limiting is configured at
    /// 3 requests per second, matching the public instance's limit.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");

        let quota = Quota::per_second(NonZeroU32::new(3).unwrap());
        let rate_limiter = RateLimiter::direct(quota);

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter,
        }
    }

    /// Execute a GET request with rate limiting and 429-retry logic.
    ///
    /// Does not translate non-success statuses into errors; the caller
    /// decides how to treat 404.
    async fn get(&self, url: &str) -> anyhow::Result<reqwest::Response> {
        let mut retries = 0u32;
        loop {
            self.rate_limiter.until_ready().await;

            let resp = self
                .client
                .get(url)
                .send()
                .await
                .with_context(|| format!("Jikan request failed: {url}"))?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!(
                    retry = retries,
                    wait_secs = wait,
                    "Jikan returned 429, backing off"
                );
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            return Ok(resp);
        }
    }
}

/// Assemble a [`TitleRecord`] from the raw Jikan payload.
///
/// Returns `None` when the payload carries no usable title at all.
fn to_title_record(anime: JikanAnime) -> Option<TitleRecord> {
    let mut titles = Vec::new();
    if let Some(title) = anime.title.filter(|t| !t.trim().is_empty()) {
        titles.push(title);
    }
    if let Some(english) = anime.title_english.filter(|t| !t.trim().is_empty()) {
        if !titles.contains(&english) {
            titles.push(english);
        }
    }
    if titles.is_empty() {
        return None;
    }

    let synonyms = anime
        .title_synonyms
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect();

    Some(TitleRecord { titles, synonyms })
}

#[async_trait]
impl TitleProvider for JikanProvider {
    fn name(&self) -> &'static str {
        "jikan"
    }

    async fn fetch_title_record(&self, external_id: u64) -> anyhow::Result<Option<TitleRecord>> {
        let url = format!("{}/anime/{external_id}", self.base_url);
        debug!(url = %url, "Jikan fetch title record");

        let resp = self.get(&url).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: JikanEnvelope = resp
            .error_for_status()
            .with_context(|| format!("Jikan request returned error: {url}"))?
            .json()
            .await
            .context("failed to parse Jikan anime response")?;

        Ok(body.data.and_then(to_title_record))
    }
}
