mod advisory;
mod affect;
mod core;
mod harm;
mod snapshot;
mod sync;
mod tools;

pub use advisory::{AdvisoryConfig, AdvisoryOverride};
pub use affect::AffectConfig;
pub use self::core::Config;
pub use harm::HarmConfig;
pub use snapshot::{SnapshotBackend, SnapshotConfig};
pub use sync::SyncConfig;
pub use tools::ToolsConfig;
