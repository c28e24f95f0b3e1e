//! API integration tests.
//!
//! Tests HTTP endpoints against a [`TestHarness`] server running on a random
//! port, with wiremock standing in for the upstream services.

mod common;

use common::{detail_page, episode_envelope, jikan_anime, search_page, TestHarness};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_200() {
    let (_harness, addr) = TestHarness::with_server().await;
    let url = format!("http://{addr}/health");

    let resp = reqwest::get(&url).await.expect("request failed");
    assert_eq!(resp.status(), 200);

    let body = resp.text().await.unwrap();
    assert_eq!(body, "ok");
}

// ---------------------------------------------------------------------------
// External-id lookups
// ---------------------------------------------------------------------------

#[tokio::test]
async fn numeric_id_resolves_and_lists_episodes() {
    let (harness, addr) = TestHarness::with_server().await;

    Mock::given(method("GET"))
        .and(path("/anime/1535"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jikan_anime(
            1535,
            "Death Note",
            Some("Death Note"),
            &[],
        )))
        .mount(&harness.metadata)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(&[(
            "Death Note",
            "/death-note-60",
        )])))
        .mount(&harness.catalog)
        .await;

    Mock::given(method("GET"))
        .and(path("/ajax/v2/episode/list/60"))
        .respond_with(ResponseTemplate::new(200).set_body_json(episode_envelope(37, &[])))
        .mount(&harness.catalog)
        .await;

    let url = format!("http://{addr}/api/anime/1535");
    let json: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["results"]["success"], true);
    assert_eq!(json["results"]["externalId"], 1535);
    assert_eq!(json["results"]["internalId"], "death-note-60");
    assert_eq!(json["results"]["totalEpisodes"], 37);
    assert_eq!(
        json["results"]["episodes"].as_array().unwrap().len(),
        37
    );
}

#[tokio::test]
async fn statically_mapped_id_skips_upstream_services() {
    let (harness, addr) = TestHarness::with_server().await;

    Mock::given(method("GET"))
        .and(path("/ajax/v2/episode/list/100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(episode_envelope(2, &[])))
        .mount(&harness.catalog)
        .await;

    let url = format!("http://{addr}/api/anime/21");
    let json: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();

    assert_eq!(json["results"]["success"], true);
    assert_eq!(json["results"]["internalId"], "one-piece-100");
    assert_eq!(json["results"]["externalId"], 21);

    // The metadata service was never consulted; the catalog only served the
    // episode listing.
    assert_eq!(harness.metadata_requests().await, 0);
    assert_eq!(harness.catalog_requests().await, 1);
}

#[tokio::test]
async fn unknown_numeric_id_reports_domain_failure() {
    let (harness, addr) = TestHarness::with_server().await;

    Mock::given(method("GET"))
        .and(path("/anime/999999999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&harness.metadata)
        .await;

    let url = format!("http://{addr}/api/anime/999999999");
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["results"]["success"], false);
    assert!(json["results"]["message"]
        .as_str()
        .unwrap()
        .contains("999999999"));
    assert!(json["results"].get("episodes").is_none());
}

#[tokio::test]
async fn unmatched_title_failure_message_names_the_show() {
    let (harness, addr) = TestHarness::with_server().await;

    Mock::given(method("GET"))
        .and(path("/anime/404404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jikan_anime(
            404404,
            "Very Obscure Show",
            None,
            &[],
        )))
        .mount(&harness.metadata)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(&[])))
        .mount(&harness.catalog)
        .await;

    let url = format!("http://{addr}/api/anime/404404");
    let json: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();

    assert_eq!(json["results"]["success"], false);
    assert!(json["results"]["message"]
        .as_str()
        .unwrap()
        .contains("Very Obscure Show"));
}

// ---------------------------------------------------------------------------
// Internal-id lookups
// ---------------------------------------------------------------------------

#[tokio::test]
async fn slug_lookup_extracts_directly_and_recovers_external_id() {
    let (harness, addr) = TestHarness::with_server().await;

    Mock::given(method("GET"))
        .and(path("/ajax/v2/episode/list/806"))
        .respond_with(ResponseTemplate::new(200).set_body_json(episode_envelope(5, &[3])))
        .mount(&harness.catalog)
        .await;

    Mock::given(method("GET"))
        .and(path("/bleach-806"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(269)))
        .mount(&harness.catalog)
        .await;

    let url = format!("http://{addr}/api/anime/bleach-806");
    let json: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();

    assert_eq!(json["results"]["success"], true);
    assert_eq!(json["results"]["internalId"], "bleach-806");
    assert_eq!(json["results"]["externalId"], 269);
    assert_eq!(json["results"]["totalEpisodes"], 5);
    assert_eq!(json["results"]["episodes"][2]["isFiller"], true);

    // No resolution happened, so the metadata service stayed untouched.
    assert_eq!(harness.metadata_requests().await, 0);
}

#[tokio::test]
async fn slug_with_no_listing_returns_zero_episodes() {
    let (harness, addr) = TestHarness::with_server().await;

    Mock::given(method("GET"))
        .and(path("/ajax/v2/episode/list/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&harness.catalog)
        .await;

    let url = format!("http://{addr}/api/anime/ghost-show-1");
    let json: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();

    assert_eq!(json["results"]["success"], true);
    assert_eq!(json["results"]["totalEpisodes"], 0);
    assert_eq!(json["results"]["episodes"].as_array().unwrap().len(), 0);
}
