use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::resolver::{ResolverOptions, StaticTable};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Authoritative external-to-internal id mappings, keyed by the external
    /// numeric id (TOML requires string keys). Consulted before the cache
    /// and before any network call.
    #[serde(default = "default_static_mappings")]
    pub static_mappings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            resolver: ResolverConfig::default(),
            metadata: MetadataConfig::default(),
            catalog: CatalogConfig::default(),
            static_mappings: default_static_mappings(),
        }
    }
}

impl Config {
    /// Parse the static mapping table into its runtime form.
    ///
    /// Non-numeric keys are a configuration fault and propagate as fatal.
    pub fn static_table(&self) -> Result<StaticTable> {
        let mut entries = HashMap::with_capacity(self.static_mappings.len());
        for (key, value) in &self.static_mappings {
            let external_id: u64 = key
                .parse()
                .with_context(|| format!("static mapping key is not a numeric id: {key:?}"))?;
            entries.insert(external_id, value.clone());
        }
        Ok(StaticTable::new(entries))
    }

    /// Resolver decision-policy tunables.
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            match_threshold: self.resolver.match_threshold,
            first_result_fallback: self.resolver.first_result_fallback,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Minimum similarity a search candidate must exceed to be accepted.
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,

    /// Accept the first result of the first non-empty search when nothing
    /// clears the threshold. Off by default; trades precision for recall.
    #[serde(default)]
    pub first_result_fallback: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            match_threshold: default_match_threshold(),
            first_result_fallback: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataConfig {
    /// Base URL of the external metadata API.
    #[serde(default = "default_metadata_base_url")]
    pub base_url: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: default_metadata_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Base URL of the internal catalog site.
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_match_threshold() -> f64 {
    0.7
}

fn default_metadata_base_url() -> String {
    "https://api.jikan.moe/v4".to_string()
}

fn default_catalog_base_url() -> String {
    "https://hianime.to".to_string()
}

/// Built-in seed mappings for titles whose search behavior is known to be
/// unreliable (franchise names shared by dozens of entries).
fn default_static_mappings() -> HashMap<String, String> {
    HashMap::from([
        ("21".to_string(), "one-piece-100".to_string()),
        ("20".to_string(), "naruto-677".to_string()),
        ("269".to_string(), "bleach-806".to_string()),
        ("1735".to_string(), "naruto-shippuden-355".to_string()),
    ])
}
