//! Search state machine.
//!
//! [`SearchState::apply`] is the only way the coordinator's state changes.
//! It is pure: given the current state and one [`Event`] it returns a
//! [`Transition`] carrying the next state and the [`Effect`]s the driver
//! must perform (arm the quiet-period timer, issue a fetch). Nothing here
//! touches the network or the clock, so every ordering scenario can be
//! replayed in a plain unit test.
//!
//! Staleness is decided by token comparison: a response is applied only if
//! its token is the one currently in flight. Tokens are minted in increasing
//! order and a new keystroke withdraws the in-flight token, so a late
//! response for a superseded request is always dropped.

use std::fmt;

use cine_core::{Error, ListQuery, MovieSummary};

use super::view::{SearchView, ViewError, ViewStatus};

/// Generation id minted for each fetch. Only the coordinator creates these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Coarse lifecycle of the search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Showing trending with nothing pending.
    Idle,
    /// A keystroke arrived; waiting for the quiet period to elapse.
    Debouncing,
    /// A fetch is in flight.
    Loading,
    /// Search results (or an error) are displayed with nothing pending.
    Settled,
}

/// Results produced by one fetch, tagged with the request that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub token: RequestToken,
    pub query: ListQuery,
    pub movies: Vec<MovieSummary>,
}

/// Everything that can happen to the coordinator.
#[derive(Debug, Clone)]
pub enum Event {
    /// The coordinator came up; issues the initial fetch for the field's text
    /// (trending when it is empty).
    Started,
    /// The input text changed.
    Input(String),
    /// The user pressed Enter: commit the current text without waiting.
    Submit,
    /// The quiet-period timer armed for `generation` fired.
    QuietPeriodElapsed { generation: u64 },
    /// A fetch finished (successfully or not).
    Response {
        token: RequestToken,
        outcome: cine_core::Result<Vec<MovieSummary>>,
    },
    /// Re-issue the fetch that last failed.
    Retry,
}

/// Side effects the driver carries out after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// (Re)start the quiet-period timer; it reports back with `generation`.
    ArmTimer { generation: u64 },
    /// Drop any armed timer.
    CancelTimer,
    /// Issue a list fetch tagged with `token`.
    Fetch { token: RequestToken, query: ListQuery },
}

/// Record of one applied event.
#[derive(Debug, Clone)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub state: SearchState,
    pub effects: Vec<Effect>,
    /// A response arrived for a superseded request and was dropped.
    pub discarded: Option<RequestToken>,
}

/// Complete coordinator state.
#[derive(Debug, Clone)]
pub struct SearchState {
    /// Live text of the input field.
    text: String,
    /// Query of the most recently minted fetch.
    committed: ListQuery,
    /// Bumped on every keystroke; timers armed for older generations are ignored.
    generation: u64,
    next_token: u64,
    started: bool,
    in_flight: Option<(RequestToken, ListQuery)>,
    current: Option<ResultSet>,
    error: Option<Error>,
    phase: Phase,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            committed: ListQuery::Trending,
            generation: 0,
            next_token: 0,
            started: false,
            in_flight: None,
            current: None,
            error: None,
            phase: Phase::Idle,
        }
    }

    /// State whose input field already holds `text`, as when a page is
    /// opened with a query in its URL.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::new()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn committed(&self) -> &ListQuery {
        &self.committed
    }

    /// True iff a fetch is in flight that has been neither superseded nor settled.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The result set on display, if the last settled fetch succeeded.
    pub fn current(&self) -> Option<&ResultSet> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Apply one event and describe the resulting transition.
    pub fn apply(&self, event: Event) -> Transition {
        let mut next = self.clone();
        let mut effects = Vec::new();
        let mut discarded = None;

        match event {
            Event::Started => {
                if !next.started {
                    next.started = true;
                    let query = ListQuery::from_input(&next.text);
                    effects.push(next.mint(query));
                }
            }

            Event::Input(text) => {
                if text != next.text {
                    next.text = text;
                    next.generation += 1;
                    // The request for the old text no longer matches the field.
                    next.in_flight = None;
                    next.phase = Phase::Debouncing;
                    effects.push(Effect::ArmTimer {
                        generation: next.generation,
                    });
                }
            }

            Event::QuietPeriodElapsed { generation } => {
                if next.phase == Phase::Debouncing && generation == next.generation {
                    let query = ListQuery::from_input(&next.text);
                    effects.push(next.mint(query));
                }
            }

            Event::Submit => {
                let query = ListQuery::from_input(&next.text);
                let already_fetching = next
                    .in_flight
                    .as_ref()
                    .is_some_and(|(_, q)| *q == query);
                if next.phase == Phase::Debouncing {
                    // Invalidate the armed timer so it cannot fire a second fetch.
                    next.generation += 1;
                    effects.push(Effect::CancelTimer);
                }
                if !already_fetching {
                    effects.push(next.mint(query));
                }
            }

            Event::Retry => {
                // The error panel stays up while debouncing, so retry is live there
                // too and fetches what the field holds now.
                if next.error.is_some() && next.phase != Phase::Loading {
                    if next.phase == Phase::Debouncing {
                        next.generation += 1;
                        effects.push(Effect::CancelTimer);
                    }
                    let query = ListQuery::from_input(&next.text);
                    effects.push(next.mint(query));
                }
            }

            Event::Response { token, outcome } => match next.in_flight.take() {
                Some((expected, query)) if expected == token => {
                    match outcome {
                        Ok(movies) => {
                            next.phase = if query.is_search() {
                                Phase::Settled
                            } else {
                                Phase::Idle
                            };
                            next.error = None;
                            next.current = Some(ResultSet {
                                token,
                                query,
                                movies,
                            });
                        }
                        Err(err) => {
                            next.phase = Phase::Settled;
                            next.error = Some(err);
                            next.current = None;
                        }
                    }
                }
                other => {
                    next.in_flight = other;
                    discarded = Some(token);
                }
            },
        }

        Transition {
            from: self.phase,
            to: next.phase,
            state: next,
            effects,
            discarded,
        }
    }

    /// State after a single fetch for `text` completed with `outcome`.
    ///
    /// Used where there is no live input stream (server-rendered pages, the
    /// one-shot CLI commands) so they project results exactly as a live
    /// coordinator would.
    pub fn settled(text: &str, outcome: cine_core::Result<Vec<MovieSummary>>) -> Self {
        let mut state = Self::new();
        state.started = true;
        state.text = text.to_string();
        let token = state.begin(ListQuery::from_input(text));
        state.apply(Event::Response { token, outcome }).state
    }

    /// Mint the next token for `query` and mark it in flight.
    fn begin(&mut self, query: ListQuery) -> RequestToken {
        let token = RequestToken(self.next_token);
        self.next_token += 1;
        self.committed = query.clone();
        self.in_flight = Some((token, query));
        self.phase = Phase::Loading;
        token
    }

    fn mint(&mut self, query: ListQuery) -> Effect {
        let token = self.begin(query.clone());
        Effect::Fetch { token, query }
    }

    /// Project the state into what the view renderer consumes.
    pub fn view(&self) -> SearchView {
        let status = match self.phase {
            Phase::Idle => ViewStatus::Idle,
            Phase::Debouncing => ViewStatus::Debouncing,
            Phase::Loading => ViewStatus::Loading,
            Phase::Settled if self.error.is_some() => ViewStatus::Failed,
            Phase::Settled => ViewStatus::Ready,
        };

        // Nothing has settled yet, so there is no empty result to report.
        let awaiting = self.current.is_none() && self.error.is_none();

        // While debouncing the heading stays on the results still on display.
        let shown = match &self.current {
            Some(rs) if !self.is_loading() && self.error.is_none() => rs.query.clone(),
            None if awaiting && self.phase == Phase::Debouncing => {
                ListQuery::from_input(&self.text)
            }
            _ => self.committed.clone(),
        };

        SearchView {
            status,
            query: self.text.clone(),
            heading: shown.heading(),
            searching: shown.is_search(),
            loading: self.is_loading() || awaiting,
            results: self
                .current
                .as_ref()
                .map(|rs| rs.movies.clone())
                .unwrap_or_default(),
            error: self.error.as_ref().map(ViewError::from),
        }
    }
}
