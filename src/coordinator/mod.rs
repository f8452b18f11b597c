//! Search coordinator: turns a stream of keystrokes into one authoritative,
//! race-free result view.
//!
//! # Module layout
//!
//! - [`state`] -- the pure state machine and its reducer.
//! - [`debounce`] -- the quiet-period timer.
//! - [`driver`] -- the tokio task that runs effects and publishes views.
//! - [`view`] -- the snapshot handed to renderers.

pub mod debounce;
pub mod driver;
pub mod state;
pub mod view;

pub use driver::{fetch_with_timeout, SearchCoordinator, SearchSettings};
pub use state::{Effect, Event, Phase, RequestToken, ResultSet, SearchState, Transition};
pub use view::{SearchView, ViewError, ViewStatus};
