//! cine-core: shared domain types for cineanalytics.
//!
//! - [`movie`] -- movie summaries, details, videos and list queries.
//! - [`error`] -- the error taxonomy every fetch surfaces.
//! - [`images`] -- poster / backdrop URL construction.

pub mod error;
pub mod images;
pub mod movie;

pub use error::{Error, Result};
pub use images::{image_url, ImageSize, DEFAULT_IMAGE_BASE};
pub use movie::{ListQuery, MovieDetail, MovieSummary, Video};
