use crate::security::{ActionType, Recommendation, Tier};
use crate::tools::ToolOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle position of a ledger entry, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntryState {
    Executed,
    HarmFlagged,
    RolledBack,
    Aborted,
}

/// One tool invocation. Everything is fixed at the initial write except
/// `rollback_offered`, `harm_detected` and `rollback_applied`, each of which
/// moves from unset to set at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub action_id: String,
    pub timestamp: DateTime<Utc>,
    pub action_type: ActionType,
    pub tool_name: String,
    pub args: Value,
    pub tier: Tier,
    #[serde(default)]
    pub snapshot_id: Option<String>,
    /// Set when a snapshot was required but could not be taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_error: Option<String>,
    pub advisory_recommendation: Recommendation,
    #[serde(default)]
    pub override_reason: Option<String>,
    pub result: ToolOutcome,
    #[serde(default)]
    pub aborted: bool,
    #[serde(default)]
    pub rollback_offered: bool,
    #[serde(default)]
    pub harm_detected: Option<String>,
    #[serde(default)]
    pub rollback_applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_snapshot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_explanation: Option<String>,
}

impl ActionLogEntry {
    pub fn state(&self) -> EntryState {
        if self.rollback_applied {
            EntryState::RolledBack
        } else if self.aborted {
            EntryState::Aborted
        } else if self.harm_detected.is_some() {
            EntryState::HarmFlagged
        } else {
            EntryState::Executed
        }
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Rollback was offered and the user has not taken it up.
    pub fn awaiting_rollback(&self) -> bool {
        self.rollback_offered && !self.rollback_applied
    }
}
