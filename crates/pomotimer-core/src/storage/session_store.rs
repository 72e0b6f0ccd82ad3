//! JSON-file session history.
//!
//! Sessions live in `sessions.json` under [`data_dir`](super::data_dir) as a
//! pretty-printed array, newest first. The store never fails outward: a
//! missing, unreadable or malformed file loads as an empty history, and write
//! failures are logged and dropped.

use std::path::{Path, PathBuf};

use super::{data_dir, read_json, write_atomic};
use crate::error::StoreError;
use crate::history::Session;

pub const SESSIONS_FILE: &str = "sessions.json";

/// Storage for the session history.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at the default per-application location.
    pub fn open() -> Self {
        Self::with_path(data_dir().join(SESSIONS_FILE))
    }

    /// Store backed by an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the history, newest first. Never fails; problems yield an empty list.
    pub fn load(&self) -> Vec<Session> {
        match self.try_load() {
            Ok(Some(sessions)) => sessions,
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "no session history yet");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable session history");
                Vec::new()
            }
        }
    }

    /// Persist the full history. Failures are logged and swallowed.
    pub fn save(&self, sessions: &[Session]) {
        if let Err(e) = self.try_save(sessions) {
            tracing::warn!(error = %e, "failed to save session history");
        }
    }

    /// Fallible load, for callers that want to tell a missing file from a broken one.
    pub fn try_load(&self) -> Result<Option<Vec<Session>>, StoreError> {
        read_json(&self.path)
    }

    /// Fallible save.
    pub fn try_save(&self, sessions: &[Session]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(sessions)?;
        write_atomic(&self.path, content.as_bytes())?;
        tracing::debug!(
            count = sessions.len(),
            path = %self.path.display(),
            "saved session history"
        );
        Ok(())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SessionStatus;
    use crate::timer::Mode;
    use chrono::{TimeZone, Utc};

    fn sample() -> Vec<Session> {
        let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        vec![
            Session::new(
                "Write report",
                Mode::Focus,
                t0,
                t0 + chrono::Duration::seconds(1500),
                SessionStatus::Completed,
            ),
            Session::new(
                "",
                Mode::Break,
                t0,
                t0 + chrono::Duration::seconds(42),
                SessionStatus::Abandoned,
            ),
        ]
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_path(dir.path().join(SESSIONS_FILE));
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSIONS_FILE);
        std::fs::write(&path, "[{\"id\": 42}").unwrap();
        assert!(SessionStore::with_path(&path).load().is_empty());
    }

    #[test]
    fn schema_mismatch_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSIONS_FILE);
        std::fs::write(&path, r#"{"sessions": []}"#).unwrap();
        assert!(SessionStore::with_path(&path).load().is_empty());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_path(dir.path().join("nested").join(SESSIONS_FILE));
        let sessions = sample();

        store.save(&sessions);
        assert_eq!(store.load(), sessions);
    }

    #[test]
    fn saved_json_has_stable_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_path(dir.path().join(SESSIONS_FILE));
        store.save(&sample());

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let keys = [
            "\"id\"",
            "\"title\"",
            "\"mode\"",
            "\"started_at\"",
            "\"ended_at\"",
            "\"duration_seconds\"",
            "\"status\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| raw.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(raw.contains("\"mode\": \"Focus\""));
        assert!(raw.contains("\"status\": \"completed\""));
    }

    #[test]
    fn save_into_unwritable_location_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a dir").unwrap();
        let store = SessionStore::with_path(blocker.join(SESSIONS_FILE));

        store.save(&sample());
        assert!(store.try_save(&sample()).is_err());
        assert!(store.load().is_empty());
    }
}
