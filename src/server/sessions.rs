//! Live-search session tracking.
//!
//! Each browser tab that opts into live search gets its own
//! [`SearchCoordinator`]. Sessions that stop talking to the server are shut
//! down by a periodic cleanup task; an open event stream counts as talking.

use chrono::{DateTime, Utc};
use cine_tmdb::MovieSource;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::coordinator::{SearchCoordinator, SearchSettings, ViewStatus};

struct LiveSession {
    coordinator: SearchCoordinator,
    created_at: DateTime<Utc>,
    last_seen: Instant,
}

/// Summary of one live session, as listed by the API.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub idle_secs: u64,
    pub query: String,
    pub status: ViewStatus,
}

/// Thread-safe registry of live-search sessions.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<DashMap<String, LiveSession>>,
    source: Arc<dyn MovieSource>,
    settings: SearchSettings,
    /// Sessions idle for longer than this are shut down.
    idle_expiry: Duration,
    max_sessions: usize,
}

impl SessionManager {
    pub fn new(
        source: Arc<dyn MovieSource>,
        settings: SearchSettings,
        idle_secs: u64,
        max_sessions: usize,
    ) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            source,
            settings,
            idle_expiry: Duration::from_secs(idle_secs),
            max_sessions,
        }
    }

    /// Start a coordinator for a new session whose input already holds
    /// `initial`, and return its id. Returns `None` when the server is at
    /// its session limit even after expiring idle sessions.
    ///
    /// Must be called from within a tokio runtime.
    pub fn create(&self, initial: &str) -> Option<String> {
        if self.sessions.len() >= self.max_sessions && self.cleanup_expired() == 0 {
            tracing::warn!(limit = self.max_sessions, "Live search session limit reached");
            return None;
        }

        let id = Uuid::new_v4().to_string();
        let coordinator =
            SearchCoordinator::spawn_with_query(Arc::clone(&self.source), self.settings, initial);

        self.sessions.insert(
            id.clone(),
            LiveSession {
                coordinator,
                created_at: Utc::now(),
                last_seen: Instant::now(),
            },
        );
        tracing::info!(session_id = %id, "Started live search session");

        Some(id)
    }

    /// Look up a session's coordinator, marking the session as active.
    pub fn get(&self, id: &str) -> Option<SearchCoordinator> {
        self.sessions.get_mut(id).map(|mut session| {
            session.last_seen = Instant::now();
            session.coordinator.clone()
        })
    }

    /// Mark a session as active without handing out its coordinator.
    /// Returns `false` if it was unknown.
    pub fn touch(&self, id: &str) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut session) => {
                session.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    /// How often an open event stream must [`touch`](Self::touch) its
    /// session to keep it from expiring.
    pub fn keepalive_interval(&self) -> Duration {
        (self.idle_expiry / 2)
            .min(Duration::from_secs(30))
            .max(Duration::from_secs(1))
    }

    /// Shut a session down. Returns `false` if it was unknown.
    pub fn end(&self, id: &str) -> bool {
        match self.sessions.remove(id) {
            Some((_, session)) => {
                session.coordinator.shutdown();
                tracing::info!(
                    session_id = %id,
                    duration_secs = (Utc::now() - session.created_at).num_seconds(),
                    "Ended live search session"
                );
                true
            }
            None => false,
        }
    }

    pub fn list(&self) -> Vec<SessionInfo> {
        self.sessions
            .iter()
            .map(|entry| {
                let view = entry.coordinator.view();
                SessionInfo {
                    id: entry.key().clone(),
                    created_at: entry.created_at,
                    idle_secs: entry.last_seen.elapsed().as_secs(),
                    query: view.query,
                    status: view.status,
                }
            })
            .collect()
    }

    /// Shut down sessions that have been idle past the expiry.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_expired(&self) -> usize {
        let mut removed = 0;
        self.sessions.retain(|id, session| {
            let idle = session.last_seen.elapsed();
            if idle > self.idle_expiry {
                session.coordinator.shutdown();
                tracing::info!(
                    session_id = %id,
                    inactive_secs = idle.as_secs(),
                    "Expired live search session"
                );
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            tracing::debug!(removed, "Cleaned up expired sessions");
        }
        removed
    }

    /// Shut every session down, e.g. on server exit.
    pub fn shutdown_all(&self) {
        for entry in self.sessions.iter() {
            entry.coordinator.shutdown();
        }
        self.sessions.clear();
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Periodically expire idle sessions.
pub fn start_cleanup_task(manager: SessionManager, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            manager.cleanup_expired();
        }
    })
}
