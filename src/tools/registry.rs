use super::contract::{CapabilityContract, ContractRegistry};
use super::traits::Tool;
use super::types::ToolSpec;
use crate::config::ToolsConfig;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// An executor paired with the contract resolved for it at registration.
#[derive(Clone)]
pub struct RegisteredTool {
    pub tool: Arc<dyn Tool>,
    pub contract: CapabilityContract,
    pub mutating: bool,
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("name", &self.tool.name())
            .field("contract", &self.contract)
            .field("mutating", &self.mutating)
            .finish()
    }
}

/// Central registry for tool executors and their contracts.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
    contracts: ContractRegistry,
    mutating: HashSet<String>,
}

impl ToolRegistry {
    pub fn new(config: &ToolsConfig) -> Self {
        Self {
            tools: HashMap::new(),
            contracts: ContractRegistry::from_config(config),
            mutating: config.mutating.iter().map(|n| n.trim().to_string()).collect(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let tool: Arc<dyn Tool> = Arc::from(tool);
        let name = tool.name().to_string();
        let contract = self.contracts.get_contract(&name).clone();
        let mutating = self.mutating.contains(&name);
        tracing::debug!(
            tool = %name,
            requires_snapshot = contract.requires_snapshot,
            mutating,
            "registered tool"
        );
        self.tools.insert(
            name,
            RegisteredTool {
                tool,
                contract,
                mutating,
            },
        );
    }

    /// Remove a tool by name. Returns whether it was present.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.tools.remove(name).is_some()
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    /// Contract for any tool name, registered or not.
    pub fn get_contract(&self, name: &str) -> &CapabilityContract {
        self.tools
            .get(name)
            .map_or_else(|| self.contracts.get_contract(name), |t| &t.contract)
    }

    pub fn is_mutating(&self, name: &str) -> bool {
        self.mutating.contains(name)
    }

    /// Return sorted list of registered tool names.
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Return specs for all registered tools.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.values().map(|entry| entry.tool.spec()).collect()
    }
}
