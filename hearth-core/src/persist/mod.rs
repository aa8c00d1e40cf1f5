//! State snapshot persistence.
//!
//! The live state is snapshotted to a JSON file on a fixed interval and
//! reloaded at startup. A missing file yields an empty state rather than an
//! error, so first boot needs no seed file. Durable delivery of in-flight
//! events is explicitly out of scope - only the pile forest and task history
//! survive a restart.

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::types::SystemState;

/// Load a state snapshot; a missing file starts empty.
pub fn load_state(path: &Path) -> Result<SystemState> {
    if !path.exists() {
        debug!(path = %path.display(), "no state snapshot, starting empty");
        return Ok(SystemState::default());
    }
    let data = std::fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

/// Write a state snapshot, replacing atomically via a sibling temp file.
pub fn save_state(path: &Path, state: &SystemState) -> Result<()> {
    let data = serde_json::to_vec_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &data)?;
    std::fs::rename(&tmp, path)?;
    debug!(path = %path.display(), bytes = data.len(), "state snapshot saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pile;

    #[test]
    fn test_load_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = load_state(&dir.path().join("state.json")).unwrap();
        assert_eq!(state, SystemState::default());
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let state = SystemState {
            piles: vec![Pile {
                id: "laundry".to_string(),
                display_name: "Laundry".to_string(),
                value: 7,
                max_value: 10,
                subpiles: Vec::new(),
            }],
            task_history: Vec::new(),
        };
        save_state(&path, &state).unwrap();

        let loaded = load_state(&path).unwrap();
        assert_eq!(loaded, state);
        // temp file cleaned up by the rename
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_load_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(load_state(&path).is_err());
    }
}
