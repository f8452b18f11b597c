//! TMDB v3 response shapes and their conversion into domain types.
//!
//! Only the fields the front end consumes are declared; everything else in
//! the payload is ignored by serde.

use cine_core::{MovieDetail, MovieSummary, Video};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbListResponse {
    pub results: Vec<TmdbMovieResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbMovieResult {
    id: u64,
    title: Option<String>,
    poster_path: Option<String>,
    release_date: Option<String>,
    vote_average: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbMovieDetail {
    id: u64,
    title: Option<String>,
    poster_path: Option<String>,
    release_date: Option<String>,
    vote_average: Option<f64>,
    overview: Option<String>,
    tagline: Option<String>,
    runtime: Option<u32>,
    revenue: Option<u64>,
    backdrop_path: Option<String>,
    videos: Option<TmdbVideos>,
}

#[derive(Debug, Deserialize)]
struct TmdbVideos {
    #[serde(default)]
    results: Vec<TmdbVideo>,
}

#[derive(Debug, Deserialize)]
struct TmdbVideo {
    site: String,
    #[serde(rename = "type")]
    kind: String,
    key: String,
    name: Option<String>,
}

/// TMDB sends `""` for unknown dates and taglines; treat those as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<TmdbMovieResult> for MovieSummary {
    fn from(r: TmdbMovieResult) -> Self {
        MovieSummary {
            id: r.id,
            title: r.title.unwrap_or_default(),
            poster_path: non_empty(r.poster_path),
            release_date: non_empty(r.release_date),
            vote_average: r.vote_average.unwrap_or_default(),
        }
    }
}

impl From<TmdbMovieDetail> for MovieDetail {
    fn from(d: TmdbMovieDetail) -> Self {
        let videos = d
            .videos
            .map(|v| v.results)
            .unwrap_or_default()
            .into_iter()
            .map(|v| Video {
                site: v.site,
                kind: v.kind,
                key: v.key,
                name: v.name,
            })
            .collect();

        MovieDetail {
            id: d.id,
            title: d.title.unwrap_or_default(),
            poster_path: non_empty(d.poster_path),
            release_date: non_empty(d.release_date),
            vote_average: d.vote_average.unwrap_or_default(),
            overview: non_empty(d.overview),
            tagline: non_empty(d.tagline),
            runtime: d.runtime,
            revenue: d.revenue,
            backdrop_path: non_empty(d.backdrop_path),
            videos,
        }
    }
}
