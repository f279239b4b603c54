use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SnapshotBackend {
    #[default]
    Git,
    #[strum(to_string = "disabled", serialize = "none", serialize = "off")]
    Disabled,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default)]
    pub backend: SnapshotBackend,
    /// Repository to snapshot; defaults to the workspace directory.
    #[serde(default)]
    pub repo_dir: Option<String>,
}
