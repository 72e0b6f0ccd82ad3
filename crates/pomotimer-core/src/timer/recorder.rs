//! Turns finished or interrupted intervals into session records.
//!
//! The recorder owns the in-memory history (newest first), which stays
//! authoritative for the process even when saving to the store fails.
//! Its recording entry points are crate-private: only the engine's
//! transitions create sessions.
//!
//! Other processes may append to the same store in the meantime, so every
//! save merges the on-disk history by id instead of overwriting it.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::Mode;
use crate::history::{Session, SessionStatus};
use crate::storage::SessionStore;

/// Default noise threshold in seconds: interruptions this short are not recorded.
pub const DEFAULT_ABANDON_THRESHOLD_SECS: i64 = 1;

#[derive(Debug)]
pub struct SessionRecorder {
    store: SessionStore,
    sessions: Vec<Session>,
    abandon_threshold: Duration,
}

impl SessionRecorder {
    /// Create a recorder seeded with whatever history `store` holds.
    pub fn new(store: SessionStore) -> Self {
        let sessions = store.load();
        tracing::debug!(count = sessions.len(), "loaded session history");
        Self {
            store,
            sessions,
            abandon_threshold: Duration::seconds(DEFAULT_ABANDON_THRESHOLD_SECS),
        }
    }

    pub fn with_abandon_threshold(mut self, threshold: Duration) -> Self {
        self.abandon_threshold = threshold.max(Duration::zero());
        self
    }

    /// Recorded sessions, newest first.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Replace the in-memory history with what the store holds now.
    pub fn reload(&mut self) {
        self.sessions = self.store.load();
    }

    /// Record an interval that ran to `ended_at`.
    ///
    /// Falls back to `ended_at - full duration` when the start was never captured.
    pub(crate) fn record_completion(
        &mut self,
        mode: Mode,
        title: &str,
        started_at: Option<DateTime<Utc>>,
        ended_at: DateTime<Utc>,
    ) -> Uuid {
        let started_at = started_at.unwrap_or(ended_at - mode.duration());
        let session = Session::new(title, mode, started_at, ended_at, SessionStatus::Completed);
        tracing::info!(%mode, duration_seconds = session.duration_seconds, "interval completed");
        self.push(session)
    }

    /// Record an interval interrupted at `now` with `remaining` time left.
    ///
    /// Returns `None` without recording when the elapsed time does not exceed
    /// the abandonment threshold.
    pub(crate) fn record_abandonment(
        &mut self,
        mode: Mode,
        title: &str,
        started_at: Option<DateTime<Utc>>,
        remaining: Duration,
        now: DateTime<Utc>,
    ) -> Option<Uuid> {
        let elapsed = mode.duration() - remaining;
        if elapsed <= self.abandon_threshold {
            tracing::debug!(
                elapsed_ms = elapsed.num_milliseconds(),
                "interruption below threshold, not recorded"
            );
            return None;
        }

        let started_at = started_at.unwrap_or(now - elapsed);
        let session = Session::new(title, mode, started_at, now, SessionStatus::Abandoned);
        tracing::info!(%mode, duration_seconds = session.duration_seconds, "interval abandoned");
        Some(self.push(session))
    }

    /// Prepend `session` to the on-disk history, keep any in-memory records
    /// the store lost or never received, and save the result.
    fn push(&mut self, session: Session) -> Uuid {
        let id = session.id;
        let on_disk = self.store.load();
        let known: HashSet<Uuid> = on_disk.iter().map(|s| s.id).collect();

        let mut merged = Vec::with_capacity(on_disk.len() + self.sessions.len() + 1);
        merged.push(session);
        merged.extend(on_disk);
        merged.extend(self.sessions.drain(..).filter(|s| !known.contains(&s.id)));

        self.sessions = merged;
        self.store.save(&self.sessions);
        id
    }
}
