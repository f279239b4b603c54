use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of a tool execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success(Value),
    Failure(String),
}

impl ToolOutcome {
    pub fn success(payload: impl Into<Value>) -> Self {
        Self::Success(payload.into())
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(reason) => Some(reason.as_str()),
        }
    }

    /// One-line rendering for CLI output and log fields.
    pub fn summary(&self, max_chars: usize) -> String {
        let full = match self {
            Self::Success(Value::String(text)) => text.clone(),
            Self::Success(payload) => payload.to_string(),
            Self::Failure(reason) => format!("failure: {reason}"),
        };
        let line = full.lines().next().unwrap_or_default();
        if line.chars().count() > max_chars {
            let truncated: String = line.chars().take(max_chars).collect();
            format!("{truncated}…")
        } else {
            line.to_string()
        }
    }
}

/// Description of a registered tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
}
