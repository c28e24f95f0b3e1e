//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which stands up wiremock servers for the
//! external metadata service and the internal catalog, builds a [`Config`]
//! pointed at them, and wires a full [`AppContext`]. The [`with_server`]
//! constructor additionally starts Axum on a random port for HTTP-level
//! testing.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::net::SocketAddr;

use anibridge::config::Config;
use anibridge::server::{create_router, AppContext};
use serde_json::json;
use wiremock::MockServer;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by mock
/// upstream services.
pub struct TestHarness {
    pub ctx: AppContext,
    pub metadata: MockServer,
    pub catalog: MockServer,
}

impl TestHarness {
    /// Create a new harness with default configuration pointed at fresh mock
    /// servers.
    pub async fn new() -> Self {
        Self::with_config_mut(|_| {}).await
    }

    /// Create a new harness, letting the caller adjust the configuration
    /// before the context is built.
    pub async fn with_config_mut(adjust: impl FnOnce(&mut Config)) -> Self {
        let metadata = MockServer::start().await;
        let catalog = MockServer::start().await;

        let mut config = Config::default();
        config.metadata.base_url = metadata.uri();
        config.catalog.base_url = catalog.uri();
        adjust(&mut config);

        let ctx = AppContext::from_config(config).expect("failed to build context");

        Self {
            ctx,
            metadata,
            catalog,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new().await;
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Number of requests the metadata mock has served.
    pub async fn metadata_requests(&self) -> usize {
        self.metadata.received_requests().await.unwrap_or_default().len()
    }

    /// Number of requests the catalog mock has served.
    pub async fn catalog_requests(&self) -> usize {
        self.catalog.received_requests().await.unwrap_or_default().len()
    }
}

/// Jikan-style anime payload.
pub fn jikan_anime(
    id: u64,
    title: &str,
    title_english: Option<&str>,
    synonyms: &[&str],
) -> serde_json::Value {
    json!({
        "data": {
            "mal_id": id,
            "title": title,
            "title_english": title_english,
            "title_synonyms": synonyms,
        }
    })
}

/// Rendered search results page with one card per (title, href) pair.
pub fn search_page(items: &[(&str, &str)]) -> String {
    let cards: String = items
        .iter()
        .map(|(title, href)| {
            format!(
                r#"<div class="flw-item">
                     <div class="film-detail">
                       <h3 class="film-name"><a href="{href}">{title}</a></h3>
                     </div>
                   </div>"#
            )
        })
        .collect();
    format!(r#"<html><body><div class="film_list-wrap">{cards}</div></body></html>"#)
}

/// Ajax episode-listing envelope wrapping a fragment with `count` episodes;
/// `filler` numbers are flagged as filler.
pub fn episode_envelope(count: u32, filler: &[u32]) -> serde_json::Value {
    let items: String = (1..=count)
        .map(|n| {
            let filler_class = if filler.contains(&n) {
                " ssl-item-filler"
            } else {
                ""
            };
            format!(
                r#"<a class="ssl-item ep-item{filler_class}" data-number="{n}" data-id="9{n:03}">
                     <div class="ep-name" data-jname="第{n}話">Episode {n}</div>
                   </a>"#
            )
        })
        .collect();
    json!({ "status": true, "html": format!(r#"<div class="ss-list">{items}</div>"#) })
}

/// Title detail page embedding a sync-metadata block with `mal_id`.
pub fn detail_page(mal_id: u64) -> String {
    format!(
        r#"<html><head>
             <script id="syncData" type="application/json">{{"mal_id":"{mal_id}","anilist_id":null}}</script>
           </head><body></body></html>"#
    )
}
