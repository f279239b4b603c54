use crate::tools::CapabilityContract;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_mutating_tools() -> Vec<String> {
    vec![
        "file_write".into(),
        "file_delete".into(),
        "file_edit".into(),
        "shell_exec".into(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Tools that modify files; at Partner and above they always get a
    /// pre-action snapshot.
    #[serde(default = "default_mutating_tools")]
    pub mutating: Vec<String>,
    /// Per-tool contracts, merged over the built-in defaults.
    #[serde(default)]
    pub contracts: HashMap<String, CapabilityContract>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            mutating: default_mutating_tools(),
            contracts: HashMap::new(),
        }
    }
}

impl ToolsConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(blank) = self.mutating.iter().find(|name| name.trim().is_empty()) {
            anyhow::bail!("tools.mutating contains a blank tool name: {blank:?}");
        }
        Ok(())
    }
}
