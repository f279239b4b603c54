pub mod policy;
pub mod tier;

pub use policy::{
    ActionType, AdvisoryPolicy, OverrideRecord, OverrideTracker, PermissionCheck, Recommendation,
    baseline,
};
pub use tier::Tier;
