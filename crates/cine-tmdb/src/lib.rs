//! cine-tmdb: the fetch client behind cineanalytics.
//!
//! [`MovieSource`] is the seam every consumer talks to; [`TmdbClient`] is the
//! production implementation backed by the TMDB v3 REST API.

pub mod client;
pub mod source;
mod wire;

pub use client::{TmdbClient, TmdbOptions, DEFAULT_BASE_URL};
pub use source::{FetchRequest, FetchResponse, MovieSource};
