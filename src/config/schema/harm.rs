use serde::{Deserialize, Serialize};

fn default_failure_keywords() -> Vec<String> {
    vec![
        "error:".into(),
        "fatal:".into(),
        "panicked".into(),
        "segmentation fault".into(),
        "permission denied".into(),
        "no such file or directory".into(),
        "traceback (most recent call last)".into(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarmConfig {
    /// Case-insensitive markers that flag a free-text result as harmful.
    #[serde(default = "default_failure_keywords")]
    pub failure_keywords: Vec<String>,
}

impl Default for HarmConfig {
    fn default() -> Self {
        Self {
            failure_keywords: default_failure_keywords(),
        }
    }
}
