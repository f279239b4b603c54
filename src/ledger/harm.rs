use crate::config::HarmConfig;
use crate::tools::ToolOutcome;
use serde_json::Value;

/// Post-hoc inspection of a tool result. Must be pure; a `Some` triggers a
/// user-facing rollback offer, so implementations should lean towards
/// false negatives.
pub trait HarmDetector: Send + Sync {
    fn detect_harm(&self, tool_name: &str, result: &ToolOutcome, args: &Value) -> Option<String>;
}

/// Flags explicit failure markers in structured results and configured
/// keywords in free text.
#[derive(Debug, Clone)]
pub struct KeywordHarmDetector {
    keywords: Vec<String>,
}

impl Default for KeywordHarmDetector {
    fn default() -> Self {
        Self::from_config(&HarmConfig::default())
    }
}

impl KeywordHarmDetector {
    pub fn from_config(config: &HarmConfig) -> Self {
        Self::new(config.failure_keywords.iter().map(String::as_str))
    }

    pub fn new<'a>(keywords: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    fn scan_text(&self, text: &str) -> Option<String> {
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .find(|keyword| lowered.contains(keyword.as_str()))
            .map(|keyword| format!("output contains failure marker {keyword:?}"))
    }

    fn scan_structured(&self, payload: &serde_json::Map<String, Value>) -> Option<String> {
        match payload.get("error") {
            None | Some(Value::Null | Value::Bool(false)) => {}
            Some(Value::String(message)) if message.trim().is_empty() => {}
            Some(Value::String(message)) => return Some(format!("tool reported error: {message}")),
            Some(other) => return Some(format!("tool reported error: {other}")),
        }

        if payload.get("success") == Some(&Value::Bool(false)) {
            return Some("tool reported success=false".into());
        }

        if let Some(status) = payload.get("status").and_then(Value::as_str) {
            let status = status.to_ascii_lowercase();
            if matches!(status.as_str(), "error" | "failed" | "failure") {
                return Some(format!("tool reported status {status}"));
            }
        }

        let exit_code = payload.get("exit_code").and_then(Value::as_i64);
        if let Some(code) = exit_code
            && code != 0
        {
            return Some(format!("command exited with status {code}"));
        }

        // An explicit success marker outranks whatever the tool printed.
        if exit_code == Some(0) || payload.get("success") == Some(&Value::Bool(true)) {
            return None;
        }

        ["stderr", "output"]
            .iter()
            .filter_map(|field| payload.get(*field).and_then(Value::as_str))
            .find_map(|text| self.scan_text(text))
    }
}

impl HarmDetector for KeywordHarmDetector {
    fn detect_harm(&self, _tool_name: &str, result: &ToolOutcome, _args: &Value) -> Option<String> {
        match result {
            ToolOutcome::Failure(reason) => Some(format!("tool reported failure: {reason}")),
            ToolOutcome::Success(Value::Object(payload)) => self.scan_structured(payload),
            ToolOutcome::Success(Value::String(text)) => self.scan_text(text),
            ToolOutcome::Success(_) => None,
        }
    }
}
