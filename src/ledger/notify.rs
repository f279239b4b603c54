use crate::security::{ActionType, Recommendation, Tier};
use serde_json::Value;

/// What a notifier learns about an action before it runs.
#[derive(Debug, Clone)]
pub struct ActionNotice<'a> {
    pub action_id: &'a str,
    pub tool_name: &'a str,
    pub action_type: &'a ActionType,
    pub tier: Tier,
    pub recommendation: Recommendation,
    pub args: &'a Value,
}

/// Receives pre-execution notices for tools whose contract asks for one.
/// Must not block for long; the tool waits on it.
pub trait ActionNotifier: Send + Sync {
    fn notify(&self, notice: &ActionNotice<'_>);
}

/// Emits each notice as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl ActionNotifier for LogNotifier {
    fn notify(&self, notice: &ActionNotice<'_>) {
        tracing::info!(
            action_id = notice.action_id,
            tool = notice.tool_name,
            action = %notice.action_type,
            tier = %notice.tier,
            recommendation = %notice.recommendation,
            "about to run tool"
        );
    }
}
