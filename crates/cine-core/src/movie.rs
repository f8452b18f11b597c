//! Movie data model shared by the fetch client, the search coordinator and
//! the renderers.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// List queries
// ---------------------------------------------------------------------------

/// Which list endpoint a result set comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "term", rename_all = "lowercase")]
pub enum ListQuery {
    /// Trending movies this week.
    Trending,
    /// Free-text title search. The term is never empty.
    Search(String),
}

impl ListQuery {
    /// Route raw input text to a list query.
    ///
    /// Surrounding whitespace is dropped; text that is empty after trimming
    /// means "show trending".
    pub fn from_input(text: &str) -> Self {
        let term = text.trim();
        if term.is_empty() {
            ListQuery::Trending
        } else {
            ListQuery::Search(term.to_string())
        }
    }

    /// The search term, if this is a search.
    pub fn term(&self) -> Option<&str> {
        match self {
            ListQuery::Trending => None,
            ListQuery::Search(term) => Some(term),
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, ListQuery::Search(_))
    }

    /// Section heading shown above the grid.
    pub fn heading(&self) -> String {
        match self {
            ListQuery::Trending => "Trending This Week".to_string(),
            ListQuery::Search(term) => format!("Results for \"{term}\""),
        }
    }
}

impl fmt::Display for ListQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListQuery::Trending => f.write_str("trending"),
            ListQuery::Search(term) => write!(f, "search({term})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// The list-card projection of a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    /// Path fragment on the image host, e.g. `/abc123.jpg`.
    pub poster_path: Option<String>,
    /// ISO-8601 date (`YYYY-MM-DD`) as reported upstream; may be absent or empty.
    pub release_date: Option<String>,
    /// Average community vote, 0.0 - 10.0.
    pub vote_average: f64,
}

impl MovieSummary {
    /// Release year, if the release date carries one.
    pub fn year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Details
// ---------------------------------------------------------------------------

/// A video attached to a movie (trailers, teasers, featurettes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Hosting site, e.g. `YouTube` or `Vimeo`.
    pub site: String,
    /// Video type, e.g. `Trailer`, `Teaser`, `Clip`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Site-specific video key.
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Video {
    pub fn is_youtube(&self) -> bool {
        self.site.eq_ignore_ascii_case("youtube")
    }
}

/// Full movie record for the detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
    /// Box-office revenue in US dollars.
    pub revenue: Option<u64>,
    pub backdrop_path: Option<String>,
    pub videos: Vec<Video>,
}

impl MovieDetail {
    /// Pick the trailer to embed: the first YouTube trailer, otherwise any
    /// YouTube video.
    pub fn trailer(&self) -> Option<&Video> {
        self.videos
            .iter()
            .find(|v| v.is_youtube() && v.kind == "Trailer")
            .or_else(|| self.videos.iter().find(|v| v.is_youtube()))
    }

    /// YouTube key of [`Self::trailer`].
    pub fn trailer_key(&self) -> Option<&str> {
        self.trailer().map(|v| v.key.as_str())
    }

    pub fn year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }

    /// Runtime formatted as `2h 46m`, or `None` when unknown or zero.
    pub fn runtime_display(&self) -> Option<String> {
        match self.runtime {
            None | Some(0) => None,
            Some(minutes) if minutes < 60 => Some(format!("{minutes}m")),
            Some(minutes) => Some(format!("{}h {}m", minutes / 60, minutes % 60)),
        }
    }

    /// Revenue formatted as `$1,234,567`, or `None` when unreported.
    pub fn revenue_display(&self) -> Option<String> {
        match self.revenue {
            None | Some(0) => None,
            Some(amount) => Some(format!("${}", group_thousands(amount))),
        }
    }

    /// The list-card projection of this movie.
    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            release_date: self.release_date.clone(),
            vote_average: self.vote_average,
        }
    }
}

/// Extract the year from a release date like `"2023-04-15"`.
///
/// Falls back to the leading four digits for partial dates (`"1999"`).
pub fn release_year(date: Option<&str>) -> Option<i32> {
    let date = date?.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(parsed.year());
    }
    date.get(..4).and_then(|y| y.parse::<i32>().ok())
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
