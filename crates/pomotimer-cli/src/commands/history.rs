use chrono::Utc;
use clap::Subcommand;
use pomotimer_core::error::Result;
use pomotimer_core::{SessionStats, SessionStore};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded sessions, newest first
    List {
        /// Show at most this many sessions
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Session statistics
    Stats {
        /// Only sessions that ended today (UTC)
        #[arg(long)]
        today: bool,
    },
}

pub fn run(action: HistoryAction) -> Result<()> {
    let sessions = SessionStore::open().load();

    match action {
        HistoryAction::List { limit } => {
            let shown = &sessions[..limit.unwrap_or(sessions.len()).min(sessions.len())];
            println!("{}", serde_json::to_string_pretty(shown)?);
        }
        HistoryAction::Stats { today } => {
            let stats = if today {
                SessionStats::for_day(&sessions, Utc::now().date_naive())
            } else {
                SessionStats::from_sessions(&sessions)
            };
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
