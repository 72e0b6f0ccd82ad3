use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::{Mode, RunState};

/// Every state change in the engine produces an Event.
/// Drivers poll the returned value; nothing is pushed behind their back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        title: String,
        ends_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_ms: u64,
        ends_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        mode: Mode,
        /// Id of the session record written for this interval.
        session_id: Uuid,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        /// Id of the abandoned session, when the interruption was recorded.
        abandoned_session_id: Option<Uuid>,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        from: Mode,
        to: Mode,
        abandoned_session_id: Option<Uuid>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        state: RunState,
        title: String,
        remaining_ms: u64,
        total_ms: u64,
        formatted: String,
        ends_at: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
}
