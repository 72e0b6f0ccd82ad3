use std::io::Write;

use chrono::Utc;
use clap::Subcommand;
use pomotimer_core::error::Result;
use pomotimer_core::{
    authorize, Config, EngineStateStore, Event, NoopScheduler, NotificationScheduler, RunState,
    SessionRecorder, SessionStore, TimerEngine,
};

use crate::notifier::TerminalNotifier;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start an interval in the current mode
    Start {
        /// Focus title (required in focus mode unless already set)
        #[arg(long)]
        title: Option<String>,
    },
    /// Set the focus title without starting
    Title {
        title: String,
    },
    /// Pause the running interval
    Pause,
    /// Resume a paused interval
    Resume,
    /// Stop the interval and return to idle
    Reset,
    /// Toggle between focus and break
    Switch,
    /// Print current timer state as JSON
    Status,
    /// Tick in the foreground until the interval ends or Ctrl-C
    Watch,
}

fn load_engine(config: &Config, scheduler: Box<dyn NotificationScheduler>) -> TimerEngine {
    let now = Utc::now();
    let recorder = SessionRecorder::new(SessionStore::open())
        .with_abandon_threshold(config.abandon_threshold());

    let engine = match EngineStateStore::open().load() {
        Some(snapshot) => TimerEngine::restore(snapshot, recorder, scheduler, now),
        None => TimerEngine::new(recorder, scheduler),
    };
    engine.with_notification_title(config.notifications.title.clone())
}

fn save_engine(engine: &TimerEngine) -> Result<()> {
    EngineStateStore::open().save(&engine.snapshot())?;
    Ok(())
}

fn print_event(event: &Event) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

/// Print the event, or the current snapshot when the action was ignored.
fn print_outcome(engine: &TimerEngine, event: Option<Event>) -> Result<()> {
    match event {
        Some(event) => print_event(&event),
        None => print_event(&engine.status(Utc::now())),
    }
}

pub fn run(action: TimerAction) -> Result<()> {
    let config = Config::load_or_default();
    let mut notifier = TerminalNotifier::new();
    let granted = config.notifications.enabled && authorize(&mut notifier);
    let scheduler: Box<dyn NotificationScheduler> = if granted {
        Box::new(notifier.clone())
    } else {
        Box::new(NoopScheduler)
    };
    let mut engine = load_engine(&config, scheduler);

    // Catch up on anything that finished while no process was watching.
    if let Some(event) = engine.tick(Utc::now()) {
        print_event(&event)?;
    }

    match action {
        TimerAction::Start { title } => {
            if let Some(title) = title {
                engine.set_focus_title(title);
            }
            if !engine.can_start() {
                tracing::warn!(
                    state = %engine.run_state(),
                    mode = %engine.mode(),
                    "start ignored: timer must be idle and focus needs a title"
                );
            }
            let event = engine.start(Utc::now());
            print_outcome(&engine, event)?;
        }
        TimerAction::Title { title } => {
            engine.set_focus_title(title);
            print_outcome(&engine, None)?;
        }
        TimerAction::Pause => {
            let event = engine.pause(Utc::now());
            print_outcome(&engine, event)?;
        }
        TimerAction::Resume => {
            let event = engine.resume(Utc::now());
            print_outcome(&engine, event)?;
        }
        TimerAction::Reset => {
            let event = engine.reset(Utc::now());
            print_outcome(&engine, event)?;
        }
        TimerAction::Switch => {
            let event = engine.switch_mode(Utc::now());
            print_outcome(&engine, event)?;
        }
        TimerAction::Status => {
            print_outcome(&engine, None)?;
        }
        TimerAction::Watch => {
            // Anything written to disk after this point came from another process.
            save_engine(&engine)?;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(watch(&mut engine, &notifier, &config))?;
        }
    }

    save_engine(&engine)?;
    Ok(())
}

/// Drive `tick` on the configured cadence while the timer runs.
///
/// Other invocations may pause, reset or switch the timer meanwhile. Their
/// snapshot is adopted before each tick, so an interval abandoned elsewhere
/// is never completed here.
async fn watch(
    engine: &mut TimerEngine,
    notifier: &TerminalNotifier,
    config: &Config,
) -> Result<()> {
    let period = std::time::Duration::from_millis(config.timer.tick_interval_ms.max(50));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let state_store = EngineStateStore::open();
    let mut last_seen = engine.snapshot();

    // The interval may have been started by an earlier invocation.
    if notifier.pending().is_none() {
        engine.reschedule_notification(Utc::now());
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut stdout = std::io::stdout();
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Utc::now();
                if let Some(external) = state_store.load().filter(|s| *s != last_seen) {
                    engine.sync_from(external.clone(), now);
                    last_seen = external;
                }

                if let Some(due) = notifier.take_due(now) {
                    eprintln!("\x07{}: {}", due.title, due.body);
                }

                let completed = engine.tick(now);
                write!(
                    stdout,
                    "\r{} · {}  {}",
                    engine.mode(),
                    engine.run_state(),
                    engine.formatted_time()
                )?;
                stdout.flush()?;

                if let Some(event) = completed {
                    writeln!(stdout)?;
                    print_event(&event)?;
                    break;
                }
                if engine.run_state() != RunState::Running {
                    writeln!(stdout)?;
                    break;
                }
            }
            _ = &mut ctrl_c => {
                writeln!(stdout)?;
                tracing::debug!("watch interrupted");
                break;
            }
        }
    }
    Ok(())
}
