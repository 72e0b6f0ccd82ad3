//! Suspended engine state for short-lived drivers.
//!
//! The CLI exits between commands, so it parks the engine's
//! [`EngineSnapshot`] in `engine.json` and restores it on the next call.
//! Because the snapshot holds absolute instants, a restored engine picks up
//! exactly where the wall clock says it should be.

use std::path::{Path, PathBuf};

use super::{data_dir, read_json, write_atomic};
use crate::error::StoreError;
use crate::timer::EngineSnapshot;

pub const ENGINE_STATE_FILE: &str = "engine.json";

#[derive(Debug, Clone)]
pub struct EngineStateStore {
    path: PathBuf,
}

impl EngineStateStore {
    pub fn open() -> Self {
        Self::with_path(data_dir().join(ENGINE_STATE_FILE))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last saved snapshot, or `None` when missing or unreadable.
    pub fn load(&self) -> Option<EngineSnapshot> {
        match read_json(&self.path) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable engine state");
                None
            }
        }
    }

    pub fn save(&self, snapshot: &EngineSnapshot) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(snapshot)?;
        write_atomic(&self.path, content.as_bytes())
    }
}
