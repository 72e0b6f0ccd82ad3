mod config;
pub mod engine_state;
pub mod session_store;

pub use config::{Config, NotificationsConfig, TimerConfig};
pub use engine_state::EngineStateStore;
pub use session_store::SessionStore;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// Returns the per-application data directory.
///
/// `POMOTIMER_DATA_DIR` wins when set. Otherwise `~/.config/pomotimer[-dev]/`,
/// where the `-dev` suffix is used when `POMOTIMER_ENV=dev`.
///
/// The directory is not created here; writers create it on demand.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("POMOTIMER_DATA_DIR") {
        return PathBuf::from(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMOTIMER_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("pomotimer-dev")
    } else {
        base_dir.join("pomotimer")
    }
}

/// Replace `path` with `contents` in one step.
///
/// Writes a sibling temp file, fsyncs it and renames it over the target, so
/// readers observe either the previous content or the new content in full.
/// Parent directories are created as needed.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::InvalidPath(path.to_path_buf()))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| StoreError::InvalidPath(path.to_path_buf()))?;

    let write_err = |source| StoreError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = parent.join(tmp_name);

    let result = (|| {
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(contents)?;
        tmp.sync_all()?;
        drop(tmp);
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result.map_err(write_err)
}

/// Read and decode a JSON file. `Ok(None)` when the file does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })
}
