use crate::security::{ActionType, Recommendation, Tier};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Replaces one cell of the baseline advisory table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryOverride {
    pub tier: Tier,
    pub action: ActionType,
    pub recommendation: Recommendation,
}

fn default_scratch_dirs() -> Vec<String> {
    vec!["scratch".into()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    /// Workspace-relative directories where Associate-tier writes are fine.
    #[serde(default = "default_scratch_dirs")]
    pub scratch_dirs: Vec<String>,
    #[serde(default)]
    pub overrides: Vec<AdvisoryOverride>,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            scratch_dirs: default_scratch_dirs(),
            overrides: Vec::new(),
        }
    }
}

impl AdvisoryConfig {
    pub fn validate(&self) -> Result<()> {
        for dir in &self.scratch_dirs {
            let trimmed = dir.trim();
            if trimmed.is_empty() {
                anyhow::bail!("advisory.scratch_dirs must not contain blank entries");
            }
            if trimmed.split(['/', '\\']).any(|part| part == "..") {
                anyhow::bail!("advisory.scratch_dirs entry escapes the workspace: {dir}");
            }
        }
        Ok(())
    }
}
