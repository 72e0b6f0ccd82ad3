mod engine;
mod mode;
mod recorder;

pub use engine::{format_mm_ss, EngineSnapshot, TimerEngine, DEFAULT_NOTIFICATION_TITLE};
pub use mode::{Mode, RunState, BREAK_DURATION_SECS, FOCUS_DURATION_SECS};
pub use recorder::{SessionRecorder, DEFAULT_ABANDON_THRESHOLD_SECS};
