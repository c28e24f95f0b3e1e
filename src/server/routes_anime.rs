//! Anime lookup route.
//!
//! One endpoint carries both lookup styles: a digits-only path segment is an
//! external metadata id that goes through the resolver, anything else is
//! treated as an internal catalog slug and goes straight to episode
//! extraction.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::catalog::{EpisodeCollection, EpisodeRecord};
use crate::resolver::ResolveError;
use crate::server::AppContext;

pub fn anime_routes() -> Router<AppContext> {
    Router::new().route("/anime/:id", get(lookup_anime))
}

/// Outer envelope. The outer flag reports that the request was handled; the
/// nested `results.success` reports whether the lookup itself succeeded.
#[derive(Debug, Serialize)]
struct LookupResponse {
    success: bool,
    results: LookupResults,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupResults {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    internal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_episodes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    episodes: Option<Vec<EpisodeRecord>>,
}

impl LookupResponse {
    fn found(internal_id: String, collection: EpisodeCollection) -> Self {
        Self {
            success: true,
            results: LookupResults {
                success: true,
                external_id: collection.external_id,
                internal_id: Some(internal_id),
                total_episodes: Some(collection.total_episodes),
                episodes: Some(collection.episodes),
                ..LookupResults::default()
            },
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: true,
            results: LookupResults {
                success: false,
                message: Some(message),
                ..LookupResults::default()
            },
        }
    }
}

async fn lookup_anime(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<LookupResponse>, (StatusCode, String)> {
    let id = id.trim();
    if id.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Id cannot be empty".to_string()));
    }

    if id.chars().all(|c| c.is_ascii_digit()) {
        let external_id: u64 = id
            .parse()
            .map_err(|_| (StatusCode::BAD_REQUEST, format!("Invalid numeric id: {id}")))?;
        Ok(Json(lookup_by_external_id(&ctx, external_id).await))
    } else {
        Ok(Json(lookup_by_internal_id(&ctx, id).await))
    }
}

async fn lookup_by_external_id(ctx: &AppContext, external_id: u64) -> LookupResponse {
    let internal_id = match ctx.resolver.resolve(external_id).await {
        Ok(internal_id) => internal_id,
        Err(e) => {
            tracing::info!(external_id, error = %e, "resolution failed");
            return LookupResponse::failed(failure_message(&e));
        }
    };

    match ctx.extractor.extract(&internal_id, Some(external_id)).await {
        Ok(collection) => LookupResponse::found(internal_id, collection),
        Err(e) => {
            tracing::warn!(external_id, %internal_id, error = %e, "episode extraction failed");
            LookupResponse::failed(format!("Could not retrieve episodes for {internal_id}"))
        }
    }
}

async fn lookup_by_internal_id(ctx: &AppContext, internal_id: &str) -> LookupResponse {
    match ctx.extractor.extract(internal_id, None).await {
        Ok(collection) => LookupResponse::found(internal_id.to_string(), collection),
        Err(e) => {
            tracing::warn!(internal_id, error = %e, "episode extraction failed");
            LookupResponse::failed(format!("Could not retrieve episodes for {internal_id}"))
        }
    }
}

/// Human-readable failure text. Resolution errors carry the fetched title
/// when one exists, so the message can name the show without another
/// metadata call.
fn failure_message(error: &ResolveError) -> String {
    match error {
        ResolveError::Unavailable(id) => {
            format!("No metadata record found for id {id}")
        }
        ResolveError::NotFound {
            id,
            title: Some(title),
        } => format!("Could not match \"{title}\" (id {id}) to a catalog entry"),
        ResolveError::NotFound { id, title: None } => {
            format!("Could not match id {id} to a catalog entry")
        }
    }
}
