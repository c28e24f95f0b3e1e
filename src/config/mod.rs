mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./anibridge.toml",
        "~/.config/anibridge/config.toml",
        "/etc/anibridge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    let threshold = config.resolver.match_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("resolver.match_threshold must be within [0, 1], got {threshold}");
    }

    for (name, url) in [
        ("metadata.base_url", &config.metadata.base_url),
        ("catalog.base_url", &config.catalog.base_url),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("{name} must be an http(s) URL, got {url:?}");
        }
    }

    // Surfaces malformed mapping keys at startup rather than first lookup.
    config.static_table()?;

    for (key, value) in &config.static_mappings {
        if value.trim().is_empty() {
            anyhow::bail!("static mapping for {key} has an empty internal id");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());

        let table = config.static_table().unwrap();
        assert_eq!(table.get(21), Some("one-piece-100"));
    }

    #[test]
    fn parses_full_config() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [resolver]
            match_threshold = 0.8
            first_result_fallback = true

            [metadata]
            base_url = "http://localhost:9000/v4"

            [catalog]
            base_url = "http://localhost:9001"

            [static_mappings]
            "21" = "one-piece-100"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        validate_config(&config).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.resolver.match_threshold, 0.8);
        assert!(config.resolver.first_result_fallback);
        assert_eq!(config.static_mappings.len(), 1);
    }

    #[test]
    fn missing_sections_take_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.resolver.match_threshold, 0.7);
        assert!(!config.resolver.first_result_fallback);
        assert!(config.static_mappings.contains_key("21"));
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let mut config = Config::default();
        config.resolver.match_threshold = 1.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_non_numeric_mapping_key() {
        let mut config = Config::default();
        config
            .static_mappings
            .insert("not-a-number".into(), "slug-1".into());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = Config::default();
        config.catalog.base_url = "ftp://example.com".into();
        assert!(validate_config(&config).is_err());
    }
}
