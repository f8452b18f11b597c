//! TMDB (The Movie Database) v3 fetch client.
//!
//! Implements [`MovieSource`] over three endpoints:
//!
//! - `GET /trending/movie/week`
//! - `GET /search/movie?query=<term>`
//! - `GET /movie/<id>?append_to_response=videos`
//!
//! Features:
//! - Token-bucket rate limiting via [`governor`].
//! - Automatic retry on HTTP 429 with `Retry-After` header support (max 3 retries).
//! - Per-request timeout, surfaced as [`Error::Timeout`].
//! - Status-aware error mapping: 404 on a detail lookup is [`Error::NotFound`],
//!   every other non-2xx status is [`Error::FetchFailed`].

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use cine_core::{Error, MovieDetail, MovieSummary, Result};
use governor::{Quota, RateLimiter};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::source::MovieSource;
use crate::wire::{TmdbListResponse, TmdbMovieDetail};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const MAX_RETRIES: u32 = 3;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Connection settings for [`TmdbClient`].
#[derive(Debug, Clone)]
pub struct TmdbOptions {
    pub api_key: String,
    /// API root without trailing slash, e.g. `https://api.themoviedb.org/3`.
    pub base_url: String,
    /// ISO-639-1 language tag such as `"en-US"`.
    pub language: String,
    pub timeout: Duration,
    pub requests_per_second: u32,
}

impl TmdbOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for TmdbOptions {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "en-US".to_string(),
            timeout: Duration::from_secs(10),
            requests_per_second: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// TMDB-backed [`MovieSource`].
///
/// # Examples
///
/// ```no_run
/// use cine_tmdb::{TmdbClient, TmdbOptions};
///
/// let client = TmdbClient::new(TmdbOptions::new("your-api-key"));
/// ```
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
    timeout: Duration,
    limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TmdbClient {
    pub fn new(options: TmdbOptions) -> Self {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        let per_second = NonZeroU32::new(options.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::direct(Quota::per_second(per_second));

        Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            api_key: options.api_key,
            language: options.language,
            timeout: options.timeout,
            limiter,
        }
    }

    /// Returns `true` when an API key has been configured.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Execute a GET request with rate limiting and 429-retry logic, then
    /// decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let mut retries = 0u32;

        loop {
            self.limiter.until_ready().await;
            debug!(path, "TMDB request");

            let resp = self
                .http
                .get(&url)
                .query(&[("api_key", self.api_key.as_str()), ("language", self.language.as_str())])
                .query(params)
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;

            let status = resp.status();
            if status == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
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
                    "TMDB returned 429, backing off"
                );
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            if !status.is_success() {
                debug!(path, status = status.as_u16(), "TMDB returned error status");
                return Err(Error::FetchFailed {
                    status: status.as_u16(),
                });
            }

            let bytes = resp.bytes().await.map_err(|e| self.transport_error(e))?;
            return serde_json::from_slice(&bytes).map_err(|e| {
                warn!(path, error = %e, "failed to parse TMDB response");
                Error::ParseFailed(e.to_string())
            });
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }
        } else {
            // Strip the URL: it carries the API key.
            Error::Network(e.without_url().to_string())
        }
    }
}

#[async_trait]
impl MovieSource for TmdbClient {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn trending(&self) -> Result<Vec<MovieSummary>> {
        let body: TmdbListResponse = self.get("/trending/movie/week", &[]).await?;
        Ok(body.results.into_iter().map(Into::into).collect())
    }

    async fn search(&self, term: &str) -> Result<Vec<MovieSummary>> {
        if term.trim().is_empty() {
            return Err(Error::InvalidRequest(
                "search term must not be empty".to_string(),
            ));
        }
        let body: TmdbListResponse = self.get("/search/movie", &[("query", term)]).await?;
        Ok(body.results.into_iter().map(Into::into).collect())
    }

    async fn detail(&self, id: u64) -> Result<MovieDetail> {
        if id == 0 {
            return Err(Error::InvalidRequest("movie id must be positive".to_string()));
        }
        let detail: TmdbMovieDetail = self
            .get(&format!("/movie/{id}"), &[("append_to_response", "videos")])
            .await
            .map_err(|e| match e {
                Error::FetchFailed { status: 404 } => Error::not_found("movie", id),
                other => other,
            })?;
        Ok(detail.into())
    }
}
