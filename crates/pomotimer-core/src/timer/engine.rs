//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` periodically,
//! and every operation takes the current time as an argument.
//!
//! Remaining time is always derived from an absolute end instant (while
//! running) or a frozen remaining duration (while paused), never from counting
//! ticks. A `tick()` after an arbitrary gap still yields the right remaining
//! time or detects completion.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!   ^        |          |
//!   +--------+----------+   (tick completion, reset, switch_mode)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(recorder, Box::new(NoopScheduler));
//! engine.set_focus_title("Write report");
//! engine.start(Utc::now());
//! // In a loop:
//! engine.tick(Utc::now()); // Returns Some(Event) when the interval completes
//! ```

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::mode::{Mode, RunState};
use super::recorder::SessionRecorder;
use crate::events::Event;
use crate::history::Session;
use crate::notify::{NotificationScheduler, Notifier};

pub const DEFAULT_NOTIFICATION_TITLE: &str = "Pomodoro";

/// Serializable copy of the engine's mutable state.
///
/// Lets a driver that does not live for the whole interval (a CLI, say)
/// suspend the engine and pick it up later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub mode: Mode,
    pub run_state: RunState,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    /// Remaining milliseconds frozen at pause.
    #[serde(default)]
    pub paused_remaining_ms: Option<i64>,
    #[serde(default)]
    pub session_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub focus_title: String,
}

/// Core timer engine.
///
/// Invariant: `end_at` is set exactly when running, `paused_remaining`
/// exactly when paused, and neither while idle.
pub struct TimerEngine {
    mode: Mode,
    run_state: RunState,
    end_at: Option<DateTime<Utc>>,
    paused_remaining: Option<Duration>,
    /// Survives pause/resume so recorded sessions start at the true start.
    session_started_at: Option<DateTime<Utc>>,
    focus_title: String,
    display_remaining: Duration,
    recorder: SessionRecorder,
    notifier: Notifier,
}

impl TimerEngine {
    /// Create an idle focus-mode engine.
    pub fn new(recorder: SessionRecorder, scheduler: Box<dyn NotificationScheduler>) -> Self {
        Self {
            mode: Mode::Focus,
            run_state: RunState::Idle,
            end_at: None,
            paused_remaining: None,
            session_started_at: None,
            focus_title: String::new(),
            display_remaining: Mode::Focus.duration(),
            recorder,
            notifier: Notifier::new(scheduler, DEFAULT_NOTIFICATION_TITLE),
        }
    }

    /// Rebuild an engine from a snapshot.
    ///
    /// A snapshot that breaks the state invariant is repaired:
    /// - running without an end instant, or with one further away than a full
    ///   interval, falls back to idle
    /// - paused remaining time is clamped to `[0, full]`, and a missing one
    ///   keeps the full interval
    pub fn restore(
        snapshot: EngineSnapshot,
        recorder: SessionRecorder,
        scheduler: Box<dyn NotificationScheduler>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut engine = Self::new(recorder, scheduler);
        engine.load_snapshot(snapshot, now);
        engine
    }

    /// Adopt state written by another driver.
    ///
    /// Applies the same repairs as [`restore`](Self::restore), reloads the
    /// session history and brings the pending notification in line with the
    /// adopted state. Nothing is recorded for the interval being replaced.
    pub fn sync_from(&mut self, snapshot: EngineSnapshot, now: DateTime<Utc>) {
        tracing::debug!(state = %snapshot.run_state, "adopting external engine state");
        self.load_snapshot(snapshot, now);
        self.recorder.reload();
        match self.run_state {
            RunState::Running => self.reschedule_notification(now),
            RunState::Idle | RunState::Paused => self.notifier.cancel(),
        }
    }

    /// Use `title` for completion notifications.
    pub fn with_notification_title(mut self, title: impl Into<String>) -> Self {
        self.notifier.set_title(title);
        self
    }

    /// Ask for the completion notification of the running interval again,
    /// replacing whatever is pending. No-op unless running.
    pub fn reschedule_notification(&mut self, now: DateTime<Utc>) {
        if let (RunState::Running, Some(end_at)) = (self.run_state, self.end_at) {
            self.notifier.schedule(end_at, self.mode.completion_message(), now);
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn focus_title(&self) -> &str {
        &self.focus_title
    }

    pub fn set_focus_title(&mut self, title: impl Into<String>) {
        self.focus_title = title.into();
    }

    pub fn end_at(&self) -> Option<DateTime<Utc>> {
        self.end_at
    }

    pub fn paused_remaining(&self) -> Option<Duration> {
        self.paused_remaining
    }

    pub fn session_started_at(&self) -> Option<DateTime<Utc>> {
        self.session_started_at
    }

    /// Remaining time as of the last operation or tick.
    pub fn display_remaining(&self) -> Duration {
        self.display_remaining
    }

    pub fn display_remaining_ms(&self) -> u64 {
        self.display_remaining.num_milliseconds().max(0) as u64
    }

    /// Full length of the current mode's interval.
    pub fn total(&self) -> Duration {
        self.mode.duration()
    }

    /// Recorded sessions, newest first.
    pub fn sessions(&self) -> &[Session] {
        self.recorder.sessions()
    }

    /// Whether `start()` would be accepted right now.
    pub fn can_start(&self) -> bool {
        self.run_state == RunState::Idle
            && (self.mode == Mode::Break || !self.focus_title.trim().is_empty())
    }

    /// Remaining time at `now`. Pure: does not touch the displayed value.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        let full = self.mode.duration();
        match self.run_state {
            RunState::Running => self
                .end_at
                .map(|end| (end - now).max(Duration::zero()))
                .unwrap_or(full),
            RunState::Paused => self
                .paused_remaining
                .map(|left| left.max(Duration::zero()))
                .unwrap_or(full),
            RunState::Idle => full,
        }
    }

    /// Displayed remaining time as `MM:SS`, floor-truncated.
    pub fn formatted_time(&self) -> String {
        format_mm_ss(self.display_remaining)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            mode: self.mode,
            run_state: self.run_state,
            end_at: self.end_at,
            paused_remaining_ms: self.paused_remaining.map(|d| d.num_milliseconds()),
            session_started_at: self.session_started_at,
            focus_title: self.focus_title.clone(),
        }
    }

    /// Build a full state snapshot event.
    pub fn status(&self, now: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            state: self.run_state,
            title: self.focus_title.clone(),
            remaining_ms: self.display_remaining_ms(),
            total_ms: self.total().num_milliseconds() as u64,
            formatted: self.formatted_time(),
            ends_at: self.end_at,
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin an interval. Ignored unless idle, and in focus mode unless the
    /// title is non-blank.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.can_start() {
            return None;
        }

        let started_at = *self.session_started_at.get_or_insert(now);
        let duration = self.mode.duration();
        let end_at = now + duration;
        self.end_at = Some(end_at);
        self.paused_remaining = None;
        self.run_state = RunState::Running;
        self.display_remaining = duration;
        self.notifier.schedule(end_at, self.mode.completion_message(), now);

        tracing::debug!(mode = %self.mode, %started_at, %end_at, "timer started");
        Some(Event::TimerStarted {
            mode: self.mode,
            title: self.record_title(),
            ends_at: end_at,
            at: now,
        })
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.run_state != RunState::Running {
            return None;
        }

        self.notifier.cancel();
        let remaining = self.remaining_at(now);
        self.paused_remaining = Some(remaining);
        self.end_at = None;
        self.run_state = RunState::Paused;
        self.display_remaining = remaining;

        tracing::debug!(remaining_ms = remaining.num_milliseconds(), "timer paused");
        Some(Event::TimerPaused {
            remaining_ms: self.display_remaining_ms(),
            at: now,
        })
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.run_state != RunState::Paused {
            return None;
        }

        let remaining = self
            .paused_remaining
            .take()
            .unwrap_or_else(|| self.mode.duration())
            .max(Duration::zero());
        let end_at = now + remaining;
        self.end_at = Some(end_at);
        self.run_state = RunState::Running;
        self.display_remaining = remaining;
        self.notifier.schedule(end_at, self.mode.completion_message(), now);

        tracing::debug!(%end_at, "timer resumed");
        Some(Event::TimerResumed {
            remaining_ms: self.display_remaining_ms(),
            ends_at: end_at,
            at: now,
        })
    }

    /// Return to idle, recording the interrupted interval if it ran long enough.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let abandoned_session_id = self.interrupt(now);
        self.clear();
        self.display_remaining = self.mode.duration();

        Some(Event::TimerReset {
            mode: self.mode,
            abandoned_session_id,
            at: now,
        })
    }

    /// Toggle focus/break and reset. An interrupted interval is recorded
    /// under the mode it was running in.
    pub fn switch_mode(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let from = self.mode;
        let abandoned_session_id = self.interrupt(now);
        self.mode = from.toggled();
        self.clear();
        self.display_remaining = self.mode.duration();

        tracing::debug!(%from, to = %self.mode, "mode switched");
        Some(Event::ModeSwitched {
            from,
            to: self.mode,
            abandoned_session_id,
            at: now,
        })
    }

    /// Call periodically, at any frequency. Returns
    /// `Some(Event::TimerCompleted)` when the running interval has finished.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.display_remaining = self.remaining_at(now);

        if self.run_state != RunState::Running || self.display_remaining > Duration::zero() {
            return None;
        }

        let ended_at = self.end_at.unwrap_or(now);
        let title = self.record_title();
        let session_id =
            self.recorder
                .record_completion(self.mode, &title, self.session_started_at, ended_at);
        self.clear();
        self.display_remaining = Duration::zero();

        Some(Event::TimerCompleted {
            mode: self.mode,
            session_id,
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Replace all interval state with a repaired copy of `snapshot`.
    fn load_snapshot(&mut self, snapshot: EngineSnapshot, now: DateTime<Utc>) {
        let full = snapshot.mode.duration();
        self.mode = snapshot.mode;
        self.focus_title = snapshot.focus_title;
        self.run_state = RunState::Idle;
        self.end_at = None;
        self.paused_remaining = None;
        self.session_started_at = None;

        match (snapshot.run_state, snapshot.end_at) {
            (RunState::Running, Some(end_at)) if end_at > now + full => {
                tracing::warn!(
                    %end_at,
                    "running snapshot ends beyond a full interval; restoring as idle"
                );
            }
            (RunState::Running, Some(end_at)) => {
                self.run_state = RunState::Running;
                self.end_at = Some(end_at);
                self.session_started_at = snapshot.session_started_at;
            }
            (RunState::Paused, _) => {
                let full_ms = full.num_milliseconds();
                let remaining_ms = snapshot
                    .paused_remaining_ms
                    .map_or(full_ms, |ms| ms.clamp(0, full_ms));
                self.run_state = RunState::Paused;
                self.paused_remaining = Some(Duration::milliseconds(remaining_ms));
                self.session_started_at = snapshot.session_started_at;
            }
            (RunState::Running, None) => {
                tracing::warn!("running snapshot without an end instant; restoring as idle");
            }
            (RunState::Idle, _) => {}
        }

        self.display_remaining = self.remaining_at(now);
    }

    /// Abandonment path for an active interval. No-op while idle.
    fn interrupt(&mut self, now: DateTime<Utc>) -> Option<uuid::Uuid> {
        if !self.run_state.is_active() {
            return None;
        }
        let remaining = self.remaining_at(now);
        let title = self.record_title();
        self.recorder.record_abandonment(
            self.mode,
            &title,
            self.session_started_at,
            remaining,
            now,
        )
    }

    /// Drop all interval state and cancel the pending notification.
    fn clear(&mut self) {
        self.notifier.cancel();
        self.end_at = None;
        self.paused_remaining = None;
        self.session_started_at = None;
        self.run_state = RunState::Idle;
    }

    fn record_title(&self) -> String {
        match self.mode {
            Mode::Focus => self.focus_title.trim().to_string(),
            Mode::Break => String::new(),
        }
    }
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("mode", &self.mode)
            .field("run_state", &self.run_state)
            .field("end_at", &self.end_at)
            .field("paused_remaining", &self.paused_remaining)
            .field("session_started_at", &self.session_started_at)
            .field("focus_title", &self.focus_title)
            .field("display_remaining", &self.display_remaining)
            .finish_non_exhaustive()
    }
}

/// `MM:SS`, zero-padded, floor-truncated, clamped at zero.
pub fn format_mm_ss(remaining: Duration) -> String {
    let total_seconds = remaining.num_seconds().max(0);
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
