//! Image host URL construction.
//!
//! Poster and backdrop URLs are the image base, a size segment and the
//! path fragment the API hands back. Missing fragments produce `None` so
//! renderers can fall back to a placeholder.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default TMDB image host.
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// Size segment understood by the image host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    W92,
    W185,
    W342,
    W500,
    W780,
    Original,
}

impl ImageSize {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSize::W92 => "w92",
            ImageSize::W185 => "w185",
            ImageSize::W342 => "w342",
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::Original => "original",
        }
    }

    /// Parse a size segment such as `"w500"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "w92" => Some(ImageSize::W92),
            "w185" => Some(ImageSize::W185),
            "w342" => Some(ImageSize::W342),
            "w500" => Some(ImageSize::W500),
            "w780" => Some(ImageSize::W780),
            "original" => Some(ImageSize::Original),
            _ => None,
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build a full image URL, or `None` when the API gave no path.
pub fn image_url(base: &str, size: ImageSize, path: Option<&str>) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        Some(format!("{base}/{size}{path}"))
    } else {
        Some(format!("{base}/{size}/{path}"))
    }
}
