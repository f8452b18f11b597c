mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Environment variables consulted for the API credential, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["TMDB_API_KEY", "NEXT_PUBLIC_TMDB_API_KEY"];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./cineanalytics.toml",
        "~/.config/cineanalytics/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Fill in the API key from the environment when the file leaves it empty.
fn apply_env(config: &mut Config) {
    if !config.tmdb.api_key.is_empty() {
        return;
    }
    for var in API_KEY_ENV_VARS {
        if let Ok(key) = std::env::var(var) {
            if !key.trim().is_empty() {
                tracing::debug!("Using TMDB API key from {}", var);
                config.tmdb.api_key = key.trim().to_string();
                return;
            }
        }
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if !(50..=5000).contains(&config.search.debounce_ms) {
        anyhow::bail!(
            "search.debounce_ms must be between 50 and 5000 (got {})",
            config.search.debounce_ms
        );
    }

    if config.search.request_timeout_ms == 0 {
        anyhow::bail!("search.request_timeout_ms cannot be 0");
    }

    if config.search.session_idle_secs == 0 {
        anyhow::bail!("search.session_idle_secs cannot be 0");
    }

    if config.search.max_sessions == 0 {
        anyhow::bail!("search.max_sessions cannot be 0");
    }

    if config.tmdb.requests_per_second == 0 {
        anyhow::bail!("tmdb.requests_per_second cannot be 0");
    }

    for (name, url) in [
        ("tmdb.base_url", &config.tmdb.base_url),
        ("tmdb.image_base_url", &config.tmdb.image_base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("{} must be an http(s) URL (got {:?})", name, url);
        }
    }

    if config.tmdb.api_key.is_empty() {
        tracing::warn!(
            "No TMDB API key configured; set tmdb.api_key or {}",
            API_KEY_ENV_VARS[0]
        );
    }

    Ok(())
}
