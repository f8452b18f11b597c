//! CineAnalytics - movie discovery front end for TMDB
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod coordinator;
pub mod render;
pub mod server;
