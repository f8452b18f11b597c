//! The fetch seam consumed by the search coordinator and the page routes.

use async_trait::async_trait;
use cine_core::{ListQuery, MovieDetail, MovieSummary, Result};

/// One of the three request shapes the front end issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Trending,
    Search(String),
    Detail(u64),
}

impl From<ListQuery> for FetchRequest {
    fn from(query: ListQuery) -> Self {
        match query {
            ListQuery::Trending => FetchRequest::Trending,
            ListQuery::Search(term) => FetchRequest::Search(term),
        }
    }
}

/// Payload answering a [`FetchRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResponse {
    Movies(Vec<MovieSummary>),
    Detail(Box<MovieDetail>),
}

/// Async source of movie metadata.
///
/// Implementations issue exactly one logical request per call and never
/// recover errors themselves: a failure is returned to the caller, never
/// replaced by an empty list. No caching happens at this layer.
#[async_trait]
pub trait MovieSource: Send + Sync {
    /// Short, lowercase identifier for this source (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Movies trending this week, in the order the API ranks them.
    async fn trending(&self) -> Result<Vec<MovieSummary>>;

    /// Movies whose title matches `term`. `term` must not be empty.
    async fn search(&self, term: &str) -> Result<Vec<MovieSummary>>;

    /// Full record for one movie, including its videos.
    async fn detail(&self, id: u64) -> Result<MovieDetail>;

    /// Run a list query against the matching endpoint.
    async fn fetch_list(&self, query: &ListQuery) -> Result<Vec<MovieSummary>> {
        match query {
            ListQuery::Trending => self.trending().await,
            ListQuery::Search(term) => self.search(term).await,
        }
    }

    /// Dispatch any request shape.
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        match request {
            FetchRequest::Trending => self.trending().await.map(FetchResponse::Movies),
            FetchRequest::Search(term) => self.search(&term).await.map(FetchResponse::Movies),
            FetchRequest::Detail(id) => self
                .detail(id)
                .await
                .map(|d| FetchResponse::Detail(Box::new(d))),
        }
    }
}
