use super::super::{AdvisoryConfig, AffectConfig, HarmConfig, SnapshotConfig, SyncConfig, ToolsConfig};
use anyhow::Result;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workspace directory - computed from home, not serialized
    #[serde(skip)]
    pub workspace_dir: PathBuf,
    /// Directory holding `affect.json` and `ledger.jsonl` - computed, not serialized
    #[serde(skip)]
    pub state_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Optional workspace override (`~` is expanded).
    #[serde(default)]
    pub workspace: Option<String>,

    #[serde(default)]
    pub affect: AffectConfig,

    #[serde(default)]
    pub advisory: AdvisoryConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub harm: HarmConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,

    #[serde(default)]
    pub sync: SyncConfig,
}

pub(super) fn trustward_home() -> PathBuf {
    let home = UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
    home.join(".trustward")
}

pub(super) fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw.trim()).into_owned())
}

impl Default for Config {
    fn default() -> Self {
        let trustward_dir = trustward_home();

        Self {
            workspace_dir: trustward_dir.join("workspace"),
            state_dir: trustward_dir.join("state"),
            config_path: trustward_dir.join("config.toml"),
            workspace: None,
            affect: AffectConfig::default(),
            advisory: AdvisoryConfig::default(),
            tools: ToolsConfig::default(),
            harm: HarmConfig::default(),
            snapshot: SnapshotConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.affect.validate()?;
        self.advisory.validate()?;
        self.tools.validate()?;
        if self.sync.conflict_window_secs == 0 {
            anyhow::bail!("sync.conflict_window_secs must be >= 1");
        }
        Ok(())
    }

    /// Directory the snapshot provider operates on.
    pub fn snapshot_repo_dir(&self) -> PathBuf {
        self.snapshot
            .repo_dir
            .as_deref()
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(|| self.workspace_dir.clone(), expand_path)
    }

    pub fn affect_state_path(&self) -> PathBuf {
        self.state_dir.join("affect.json")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.state_dir.join("ledger.jsonl")
    }
}
