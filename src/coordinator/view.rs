//! What the view renderer consumes from the coordinator.

use cine_core::{Error, MovieSummary};
use serde::Serialize;

/// Rendering status of the search section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewStatus {
    /// Trending is on display and nothing is pending.
    Idle,
    /// The user is typing; the previous results stay on display.
    Debouncing,
    /// A fetch is in flight; renderers show a loading indicator.
    Loading,
    /// Search results are on display (possibly zero of them).
    Ready,
    /// The last fetch failed; renderers show the error with a retry action.
    Failed,
}

/// A fetch failure, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewError {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl From<&Error> for ViewError {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

/// Snapshot of the search section.
///
/// `error` is set only when the last fetch failed, so "no results" and
/// "something went wrong" can never be confused.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchView {
    pub status: ViewStatus,
    /// Current text of the input field.
    pub query: String,
    /// Section title, e.g. `Trending This Week`.
    pub heading: String,
    /// Whether the heading refers to a search rather than trending.
    pub searching: bool,
    pub loading: bool,
    pub results: Vec<MovieSummary>,
    pub error: Option<ViewError>,
}

impl SearchView {
    pub fn is_failed(&self) -> bool {
        self.status == ViewStatus::Failed
    }

    /// Whether a renderer should draw the results grid (as opposed to a
    /// loading indicator or an error panel).
    pub fn shows_grid(&self) -> bool {
        !self.loading && self.error.is_none()
    }
}
