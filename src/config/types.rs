use cine_core::DEFAULT_IMAGE_BASE;
use cine_tmdb::{TmdbOptions, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::coordinator::SearchSettings;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
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
pub struct TmdbConfig {
    /// API credential. `TMDB_API_KEY` / `NEXT_PUBLIC_TMDB_API_KEY` fill it in when empty.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_image_base_url() -> String {
    DEFAULT_IMAGE_BASE.to_string()
}
fn default_language() -> String {
    "en-US".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_requests_per_second() -> u32 {
    20
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

impl TmdbConfig {
    pub fn client_options(&self) -> TmdbOptions {
        TmdbOptions {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            language: self.language.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            requests_per_second: self.requests_per_second,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a fetch is issued
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// A live-search fetch with no answer inside this window settles as a timeout
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Live-search sessions idle for longer than this are torn down
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,

    /// Live-search sessions allowed at once; creating more is refused
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_debounce_ms() -> u64 {
    400
}
fn default_request_timeout_ms() -> u64 {
    8000
}
fn default_session_idle_secs() -> u64 {
    600
}
fn default_max_sessions() -> usize {
    256
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            session_idle_secs: default_session_idle_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl SearchConfig {
    pub fn settings(&self) -> SearchSettings {
        SearchSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}
