use crate::security::Tier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of effect a tool has, used as the advisory table column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    Read,
    Write,
    ShellExec,
    Network,
    Other(String),
}

impl ActionType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::ShellExec => "shell_exec",
            Self::Network => "network",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl From<&str> for ActionType {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "read" => Self::Read,
            "write" => Self::Write,
            "shell_exec" | "shell" | "exec" => Self::ShellExec,
            "network" | "net" => Self::Network,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ActionType {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<ActionType> for String {
    fn from(action: ActionType) -> Self {
        action.as_str().to_string()
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory output. Ordered from most to least permissive.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Recommendation {
    #[default]
    Allow,
    Caution,
    Restriction,
}

/// Result of a permission check. `permitted` is always `true`: the
/// recommendation is metadata for the ledger, never a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCheck {
    pub permitted: bool,
    pub tier: Tier,
    pub action: ActionType,
    pub recommendation: Recommendation,
    pub reason: String,
}

/// Execution proceeded despite a non-`Allow` recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRecord {
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub action_id: Option<String>,
    pub tier: Tier,
    pub action: ActionType,
    pub recommendation: Recommendation,
    pub reason: String,
    #[serde(default)]
    pub target: Option<String>,
}
