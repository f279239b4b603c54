//! Cross-device record merge.
mod conflict;

pub use conflict::{
    ConflictRecord, ConflictResolver, ConflictStrategy, MergeReport, Resolution, SyncRecord,
    detect_conflict, resolve,
};
