//! Property tests: arbitrary operation sequences against a simulated clock.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pomotimer_core::{NoopScheduler, RunState, SessionRecorder, SessionStore, TimerEngine};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Start,
    Pause,
    Resume,
    Tick,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Start), Just(Op::Pause), Just(Op::Resume), Just(Op::Tick)]
}

fn base() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn engine(dir: &tempfile::TempDir) -> TimerEngine {
    let store = SessionStore::with_path(dir.path().join("sessions.json"));
    let mut engine = TimerEngine::new(SessionRecorder::new(store), Box::new(NoopScheduler));
    engine.set_focus_title("property");
    engine
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn display_remaining_stays_within_bounds(
        steps in prop::collection::vec((op(), 0i64..4_000_000), 1..40)
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(&dir);
        let mut now = base();

        for (op, advance_ms) in steps {
            now += Duration::milliseconds(advance_ms);
            match op {
                Op::Start => { engine.start(now); }
                Op::Pause => { engine.pause(now); }
                Op::Resume => { engine.resume(now); }
                Op::Tick => { engine.tick(now); }
            }
            let remaining = engine.display_remaining();
            prop_assert!(remaining >= Duration::zero());
            prop_assert!(remaining <= engine.total());
            prop_assert!(engine.remaining_at(now) <= engine.total());
        }
    }

    #[test]
    fn tick_never_moves_idle_or_paused(
        pause_after_ms in 0i64..1_500_000,
        gaps in prop::collection::vec(0i64..10_000_000, 1..20)
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(&dir);
        let mut now = base();

        for gap in &gaps {
            now += Duration::milliseconds(*gap);
            engine.tick(now);
            prop_assert_eq!(engine.run_state(), RunState::Idle);
        }

        engine.start(now);
        now += Duration::milliseconds(pause_after_ms);
        engine.pause(now);
        let frozen = engine.paused_remaining();

        for gap in &gaps {
            now += Duration::milliseconds(*gap);
            prop_assert!(engine.tick(now).is_none());
            prop_assert_eq!(engine.run_state(), RunState::Paused);
            prop_assert_eq!(engine.paused_remaining(), frozen);
        }
        prop_assert!(engine.sessions().is_empty());
    }

    #[test]
    fn completion_happens_exactly_once(
        tick_gaps in prop::collection::vec(1i64..400_000, 1..60)
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(&dir);
        let mut now = base();
        engine.start(now);

        let mut completions = 0;
        for gap in tick_gaps {
            now += Duration::milliseconds(gap);
            if engine.tick(now).is_some() {
                completions += 1;
            }
        }
        // Push past the end regardless of the sampled gaps.
        now += Duration::seconds(1_500);
        if engine.tick(now).is_some() {
            completions += 1;
        }

        prop_assert_eq!(completions, 1);
        prop_assert_eq!(engine.run_state(), RunState::Idle);
        prop_assert_eq!(engine.sessions().len(), 1);
        prop_assert_eq!(engine.sessions()[0].duration_seconds, 1_500);
    }
}
