use super::state::AffectState;
use crate::error::PersistenceError;
use std::fs;
use std::path::{Path, PathBuf};

/// JSON-file persistence for [`AffectState`].
#[derive(Debug, Clone)]
pub struct AffectStore {
    path: PathBuf,
}

impl AffectStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no state has been saved yet.
    pub fn try_load(&self) -> Result<Option<AffectState>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| PersistenceError::LoadFailed {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        let parsed: AffectState =
            serde_json::from_str(&raw).map_err(|e| PersistenceError::LoadFailed {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(Some(parsed.normalized()))
    }

    /// Never fails: a missing file yields defaults silently, an unreadable
    /// one yields defaults plus a warning.
    pub fn load_or_default(&self) -> AffectState {
        match self.try_load() {
            Ok(Some(state)) => state,
            Ok(None) => AffectState::default(),
            Err(e) => {
                tracing::warn!("Falling back to default affect state: {e}");
                AffectState::default()
            }
        }
    }

    pub fn save(&self, state: &AffectState) -> Result<(), PersistenceError> {
        let content = serde_json::to_string_pretty(state)?;
        write_atomic(&self.path, &content)
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<(), PersistenceError> {
    let write_err = |e: std::io::Error| PersistenceError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).map_err(write_err)?;

    if let Err(rename_error) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(write_err(rename_error));
    }

    Ok(())
}
