use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Focus length in seconds (25 minutes).
pub const FOCUS_DURATION_SECS: i64 = 25 * 60;
/// Break length in seconds (5 minutes).
pub const BREAK_DURATION_SECS: i64 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Focus,
    Break,
}

impl Mode {
    /// Fixed interval length for this mode in seconds.
    pub fn duration_secs(self) -> i64 {
        match self {
            Mode::Focus => FOCUS_DURATION_SECS,
            Mode::Break => BREAK_DURATION_SECS,
        }
    }

    /// Fixed interval length for this mode.
    pub fn duration(self) -> Duration {
        Duration::seconds(self.duration_secs())
    }

    pub fn toggled(self) -> Self {
        match self {
            Mode::Focus => Mode::Break,
            Mode::Break => Mode::Focus,
        }
    }

    /// Notification body announced when an interval of this mode ends.
    pub fn completion_message(self) -> &'static str {
        match self {
            Mode::Focus => "Focus session complete.",
            Mode::Break => "Break time is over.",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Focus => f.write_str("Focus"),
            Mode::Break => f.write_str("Break"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
}

impl RunState {
    /// Whether an interval is in progress (running or paused).
    pub fn is_active(self) -> bool {
        matches!(self, RunState::Running | RunState::Paused)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => f.write_str("Idle"),
            RunState::Running => f.write_str("Running"),
            RunState::Paused => f.write_str("Paused"),
        }
    }
}
