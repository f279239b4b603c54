use serde::{Deserialize, Serialize};

fn default_conflict_window_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_conflict_window_secs")]
    pub conflict_window_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            conflict_window_secs: default_conflict_window_secs(),
        }
    }
}

impl SyncConfig {
    pub fn conflict_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.conflict_window_secs).unwrap_or(i64::MAX))
    }
}
