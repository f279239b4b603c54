use crate::config::ToolsConfig;
use crate::security::ActionType;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;

fn default_action_type() -> ActionType {
    ActionType::Other("unknown".into())
}

/// Static per-tool metadata. Decides whether the engine snapshots or
/// notifies before running a tool; never an authorization gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityContract {
    #[serde(default)]
    pub requires_snapshot: bool,
    #[serde(default)]
    pub requires_notification: bool,
    #[serde(default = "default_action_type")]
    pub action_type: ActionType,
    #[serde(default)]
    pub constraints: HashMap<String, Value>,
}

impl Default for CapabilityContract {
    fn default() -> Self {
        Self {
            requires_snapshot: false,
            requires_notification: false,
            action_type: default_action_type(),
            constraints: HashMap::new(),
        }
    }
}

impl CapabilityContract {
    fn new(action_type: ActionType, requires_snapshot: bool, requires_notification: bool) -> Self {
        Self {
            requires_snapshot,
            requires_notification,
            action_type,
            constraints: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_constraint(mut self, key: &str, value: Value) -> Self {
        self.constraints.insert(key.to_string(), value);
        self
    }

    pub fn constraint(&self, key: &str) -> Option<&Value> {
        self.constraints.get(key)
    }
}

/// Contracts shipped with the crate for the common tool names.
pub fn builtin_contracts() -> HashMap<String, CapabilityContract> {
    HashMap::from([
        (
            "file_read".to_string(),
            CapabilityContract::new(ActionType::Read, false, false),
        ),
        (
            "file_write".to_string(),
            CapabilityContract::new(ActionType::Write, true, false),
        ),
        (
            "file_delete".to_string(),
            CapabilityContract::new(ActionType::Write, true, true),
        ),
        (
            "shell_exec".to_string(),
            CapabilityContract::new(ActionType::ShellExec, true, true)
                .with_constraint("max_runtime_secs", json!(60)),
        ),
        (
            "http_fetch".to_string(),
            CapabilityContract::new(ActionType::Network, false, false)
                .with_constraint("max_response_bytes", json!(1_048_576)),
        ),
    ])
}

/// Read-only lookup table, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ContractRegistry {
    contracts: HashMap<String, CapabilityContract>,
    fallback: CapabilityContract,
}

impl Default for ContractRegistry {
    fn default() -> Self {
        Self {
            contracts: builtin_contracts(),
            fallback: CapabilityContract::default(),
        }
    }
}

impl ContractRegistry {
    /// Built-in contracts with configured ones layered on top.
    pub fn from_config(config: &ToolsConfig) -> Self {
        let mut registry = Self::default();
        for (name, contract) in &config.contracts {
            registry.contracts.insert(name.clone(), contract.clone());
        }
        registry
    }

    /// Unknown tools get the conservative default.
    pub fn get_contract(&self, tool_name: &str) -> &CapabilityContract {
        self.contracts.get(tool_name).unwrap_or(&self.fallback)
    }

    pub fn is_known(&self, tool_name: &str) -> bool {
        self.contracts.contains_key(tool_name)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}
