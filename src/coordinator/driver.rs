//! Async driver for the search state machine.
//!
//! [`SearchCoordinator::spawn`] starts one task that owns a [`SearchState`]
//! and is the only writer to it. Keystrokes arrive over a command channel;
//! timer firings and fetch completions arrive over an internal channel and
//! are applied through the same reducer. The latest [`SearchView`] is
//! published on a `watch` channel.

use std::sync::Arc;
use std::time::Duration;

use cine_core::{Error, ListQuery, MovieSummary};
use cine_tmdb::MovieSource;
use tokio::sync::{mpsc, watch};

use super::debounce::QuietTimer;
use super::state::{Effect, Event, RequestToken, SearchState};
use super::view::SearchView;

/// Timing knobs for a coordinator.
#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    /// Quiet period that must pass after the last keystroke before fetching.
    pub debounce: Duration,
    /// Fetches with no response inside this window settle as [`Error::Timeout`].
    pub request_timeout: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(400),
            request_timeout: Duration::from_secs(8),
        }
    }
}

#[derive(Debug)]
enum Command {
    Input(String),
    Submit,
    Retry,
    Shutdown,
}

/// Handle to a running search coordinator.
///
/// Cheap to clone; every clone talks to the same task. The task stops when
/// [`shutdown`](Self::shutdown) is called or the last handle is dropped.
#[derive(Clone)]
pub struct SearchCoordinator {
    commands: mpsc::UnboundedSender<Command>,
    view_rx: watch::Receiver<SearchView>,
}

impl SearchCoordinator {
    /// Start a coordinator. The initial trending fetch is issued immediately.
    pub fn spawn(source: Arc<dyn MovieSource>, settings: SearchSettings) -> Self {
        Self::spawn_with_query(source, settings, String::new())
    }

    /// Start a coordinator whose input already holds `initial`. The first
    /// fetch is for that text rather than trending, with no quiet period.
    pub fn spawn_with_query(
        source: Arc<dyn MovieSource>,
        settings: SearchSettings,
        initial: impl Into<String>,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let state = SearchState::with_text(initial);
        let (view_tx, view_rx) = watch::channel(state.view());

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let driver = Driver {
            timer: QuietTimer::new(settings.debounce, event_tx.clone()),
            state,
            source,
            settings,
            event_tx,
            view_tx,
        };
        tokio::spawn(driver.run(command_rx, event_rx));

        Self { commands, view_rx }
    }

    /// Replace the query text (one call per keystroke).
    pub fn input(&self, text: impl Into<String>) {
        self.send(Command::Input(text.into()));
    }

    /// Commit the current text now, skipping the quiet period.
    pub fn submit(&self) {
        self.send(Command::Submit);
    }

    /// Re-issue the fetch that last failed.
    pub fn retry(&self) {
        self.send(Command::Retry);
    }

    /// Stop the coordinator task. Outstanding responses are ignored.
    pub fn shutdown(&self) {
        self.send(Command::Shutdown);
    }

    /// Subscribe to view updates.
    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.view_rx.clone()
    }

    /// The latest published view.
    pub fn view(&self) -> SearchView {
        self.view_rx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("search coordinator already stopped");
        }
    }
}

/// Run one list fetch, settling as [`Error::Timeout`] if `window` elapses first.
pub async fn fetch_with_timeout(
    source: &dyn MovieSource,
    query: &ListQuery,
    window: Duration,
) -> cine_core::Result<Vec<MovieSummary>> {
    match tokio::time::timeout(window, source.fetch_list(query)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(Error::Timeout {
            after_ms: window.as_millis() as u64,
        }),
    }
}

struct Driver {
    state: SearchState,
    timer: QuietTimer,
    source: Arc<dyn MovieSource>,
    settings: SearchSettings,
    event_tx: mpsc::UnboundedSender<Event>,
    view_tx: watch::Sender<SearchView>,
}

impl Driver {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut events: mpsc::UnboundedReceiver<Event>,
    ) {
        self.apply(Event::Started);

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let event = match command {
                        Some(Command::Input(text)) => Event::Input(text),
                        Some(Command::Submit) => Event::Submit,
                        Some(Command::Retry) => Event::Retry,
                        Some(Command::Shutdown) | None => break,
                    };
                    self.apply(event);
                }

                // The driver holds a sender, so this never yields None.
                Some(event) = events.recv() => {
                    self.apply(event);
                }
            }
        }

        self.timer.cancel();
        tracing::debug!("search coordinator stopped");
    }

    fn apply(&mut self, event: Event) {
        let transition = self.state.apply(event);

        if let Some(token) = transition.discarded {
            tracing::debug!(token = token.get(), "discarding superseded response");
        }
        if transition.from != transition.to {
            tracing::trace!(from = ?transition.from, to = ?transition.to, "search phase changed");
        }

        self.state = transition.state;
        for effect in transition.effects {
            match effect {
                Effect::ArmTimer { generation } => self.timer.arm(generation),
                Effect::CancelTimer => self.timer.cancel(),
                Effect::Fetch { token, query } => self.fetch(token, query),
            }
        }

        let view = self.state.view();
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }

    fn fetch(&self, token: RequestToken, query: ListQuery) {
        tracing::debug!(token = token.get(), query = %query, "issuing fetch");

        let source = Arc::clone(&self.source);
        let tx = self.event_tx.clone();
        let window = self.settings.request_timeout;
        tokio::spawn(async move {
            let outcome = fetch_with_timeout(source.as_ref(), &query, window).await;
            if let Err(ref e) = outcome {
                tracing::warn!(token = token.get(), query = %query, error = %e, "fetch failed");
            }
            // Fails only when the coordinator has shut down.
            let _ = tx.send(Event::Response { token, outcome });
        });
    }
}
