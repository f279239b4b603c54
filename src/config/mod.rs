pub mod schema;

pub use schema::{
    AdvisoryConfig, AdvisoryOverride, AffectConfig, Config, HarmConfig, SnapshotBackend,
    SnapshotConfig, SyncConfig, ToolsConfig,
};
