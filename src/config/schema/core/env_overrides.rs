use super::Config;
use super::types::expand_path;
use crate::config::SnapshotBackend;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(workspace) = std::env::var("TRUSTWARD_WORKSPACE")
            && !workspace.trim().is_empty()
        {
            self.workspace_dir = expand_path(&workspace);
        }

        if let Ok(state_dir) = std::env::var("TRUSTWARD_STATE_DIR")
            && !state_dir.trim().is_empty()
        {
            self.state_dir = expand_path(&state_dir);
        }

        if let Ok(raw) = std::env::var("TRUSTWARD_SNAPSHOT_BACKEND") {
            match raw.trim().parse::<SnapshotBackend>() {
                Ok(backend) => self.snapshot.backend = backend,
                Err(e) => tracing::warn!("Ignoring TRUSTWARD_SNAPSHOT_BACKEND: {e}"),
            }
        }
    }
}
