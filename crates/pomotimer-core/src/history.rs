//! Session records and history statistics.
//!
//! A [`Session`] is written once by the recorder when an interval completes or
//! is abandoned, and never changes afterwards. History lists are ordered
//! newest first.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Completed,
    Abandoned,
}

/// One finished interval. Field order is the on-disk key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    /// Trimmed focus title; empty for break sessions.
    pub title: String,
    pub mode: Mode,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub status: SessionStatus,
}

impl Session {
    /// Build a record with a fresh id. Duration is derived from the two
    /// timestamps, rounded to whole seconds and clamped at zero.
    pub fn new(
        title: impl Into<String>,
        mode: Mode,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        status: SessionStatus,
    ) -> Self {
        let title = match mode {
            Mode::Focus => title.into().trim().to_string(),
            Mode::Break => String::new(),
        };
        let elapsed_ms = (ended_at - started_at).num_milliseconds().max(0) as u64;
        Self {
            id: Uuid::new_v4(),
            title,
            mode,
            started_at,
            ended_at,
            duration_seconds: (elapsed_ms + 500) / 1000,
            status,
        }
    }
}

/// Aggregate counts over a list of sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub abandoned_sessions: u64,
    pub completed_focus_sessions: u64,
    pub focus_seconds: u64,
    pub break_seconds: u64,
}

impl SessionStats {
    pub fn from_sessions<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> Self {
        let mut stats = Self::default();
        for session in sessions {
            stats.total_sessions += 1;
            match session.status {
                SessionStatus::Completed => {
                    stats.completed_sessions += 1;
                    if session.mode == Mode::Focus {
                        stats.completed_focus_sessions += 1;
                    }
                }
                SessionStatus::Abandoned => stats.abandoned_sessions += 1,
            }
            match session.mode {
                Mode::Focus => stats.focus_seconds += session.duration_seconds,
                Mode::Break => stats.break_seconds += session.duration_seconds,
            }
        }
        stats
    }

    /// Stats for sessions that ended on `day` (UTC).
    pub fn for_day(sessions: &[Session], day: NaiveDate) -> Self {
        Self::from_sessions(
            sessions
                .iter()
                .filter(|s| s.ended_at.date_naive() == day),
        )
    }
}
