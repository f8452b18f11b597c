//! Shared test fixtures for integration tests.
//!
//! Provides [`FakeSource`], a scripted in-memory [`MovieSource`] that
//! records every call, and helpers to build an [`AppContext`] around it.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cine_core::{Error, MovieDetail, MovieSummary, Result};
use cine_tmdb::{FetchRequest, MovieSource};
use cineanalytics::config::Config;
use cineanalytics::server::AppContext;

pub fn movie(id: u64, title: &str) -> MovieSummary {
    MovieSummary {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/poster-{id}.jpg")),
        release_date: Some("2021-10-22".to_string()),
        vote_average: 7.8,
    }
}

pub fn detail(id: u64, title: &str) -> MovieDetail {
    MovieDetail {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/poster-{id}.jpg")),
        release_date: Some("1999-03-30".to_string()),
        vote_average: 8.2,
        overview: Some("A hacker learns the truth about reality.".to_string()),
        tagline: Some("Welcome to the Real World.".to_string()),
        runtime: Some(136),
        revenue: Some(463_517_383),
        backdrop_path: None,
        videos: Vec::new(),
    }
}

#[derive(Clone)]
struct Script {
    delay: Duration,
    outcome: Result<Vec<MovieSummary>>,
}

/// Scripted movie source.
///
/// List answers are scripted per query (`None` for trending). Scripts queue
/// up: each call consumes the front entry, and the last entry keeps
/// answering once the queue is down to one. Unscripted searches answer
/// immediately with a single movie titled after the term.
#[derive(Default)]
pub struct FakeSource {
    scripts: Mutex<HashMap<Option<String>, VecDeque<Script>>>,
    details: Mutex<HashMap<u64, Result<MovieDetail>>>,
    calls: Mutex<Vec<FetchRequest>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default().with_trending(vec![movie(1, "Dune: Part Two"), movie(2, "Oppenheimer")])
    }

    pub fn with_trending(self, movies: Vec<MovieSummary>) -> Self {
        self.script(None, Duration::ZERO, Ok(movies));
        self
    }

    pub fn with_search(self, term: &str, delay: Duration, outcome: Result<Vec<MovieSummary>>) -> Self {
        self.script(Some(term.to_string()), delay, outcome);
        self
    }

    pub fn with_detail(self, id: u64, outcome: Result<MovieDetail>) -> Self {
        self.details.lock().unwrap().insert(id, outcome);
        self
    }

    /// Queue another answer for `term` (`None` for trending).
    pub fn script(&self, term: Option<String>, delay: Duration, outcome: Result<Vec<MovieSummary>>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(term)
            .or_default()
            .push_back(Script { delay, outcome });
    }

    pub fn calls(&self) -> Vec<FetchRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Terms passed to `search`, in call order.
    pub fn search_terms(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                FetchRequest::Search(term) => Some(term),
                _ => None,
            })
            .collect()
    }

    pub fn trending_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, FetchRequest::Trending))
            .count()
    }

    fn next_script(&self, term: Option<&str>) -> Option<Script> {
        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts.get_mut(&term.map(str::to_string))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }

    async fn answer(&self, term: Option<&str>) -> Result<Vec<MovieSummary>> {
        match self.next_script(term) {
            Some(script) => {
                if !script.delay.is_zero() {
                    tokio::time::sleep(script.delay).await;
                }
                script.outcome
            }
            None => Ok(term
                .map(|t| vec![movie(100, &format!("{t} (film)"))])
                .unwrap_or_default()),
        }
    }
}

#[async_trait]
impl MovieSource for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn trending(&self) -> Result<Vec<MovieSummary>> {
        self.calls.lock().unwrap().push(FetchRequest::Trending);
        self.answer(None).await
    }

    async fn search(&self, term: &str) -> Result<Vec<MovieSummary>> {
        self.calls
            .lock()
            .unwrap()
            .push(FetchRequest::Search(term.to_string()));
        if term.is_empty() {
            return Err(Error::InvalidRequest("empty search term".into()));
        }
        self.answer(Some(term)).await
    }

    async fn detail(&self, id: u64) -> Result<MovieDetail> {
        self.calls.lock().unwrap().push(FetchRequest::Detail(id));
        self.details
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Err(Error::not_found("movie", id)))
    }
}

/// Build an [`AppContext`] with default config around `source`.
pub fn test_context(source: Arc<FakeSource>) -> AppContext {
    test_context_with(Config::default(), source)
}

pub fn test_context_with(config: Config, source: Arc<FakeSource>) -> AppContext {
    AppContext::new(config, source).expect("failed to build app context")
}
