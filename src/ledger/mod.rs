//! Action ledger, snapshots, harm detection and the engine tying them to
//! tool execution.
pub mod engine;
pub mod entry;
pub mod harm;
pub mod notify;
pub mod snapshot;
pub mod store;

pub use engine::{ROLLBACK_TRUST_PENALTY, RollbackResult, RollbackStatus, SafetyEngine};
pub use entry::{ActionLogEntry, EntryState};
pub use harm::{HarmDetector, KeywordHarmDetector};
pub use notify::{ActionNotice, ActionNotifier, LogNotifier};
pub use snapshot::{
    DisabledSnapshotter, GitSnapshotter, InMemorySnapshotter, SnapshotFuture, SnapshotProvider,
};
pub use store::{ActionLedger, RollbackClaim, RollbackTarget};
