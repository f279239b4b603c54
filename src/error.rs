//! Typed error enums, one per concern. Callers match on these to tell
//! "nothing to roll back" apart from "rollback failed"; internal code keeps
//! using `anyhow::Result` for ad-hoc context chains.

use thiserror::Error;

// ─── Tool errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool {name} not found")]
    NotFound { name: String },

    /// The executor itself failed. The ledger entry is still written and
    /// carries the failure as its result.
    #[error("tool {name} execution failed (action {action_id}): {message}")]
    Execution {
        name: String,
        action_id: String,
        message: String,
    },

    #[error("tool {name} aborted before completion (action {action_id})")]
    Aborted { name: String, action_id: String },

    #[error("ledger: {0}")]
    Ledger(#[from] PersistenceError),
}

// ─── Snapshot errors ────────────────────────────────────────────────────────

/// Snapshot failures are non-fatal for execution: the engine logs them and
/// runs the tool without rollback safety.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot provider unavailable: {0}")]
    Unavailable(String),

    #[error("{op} failed: {message}")]
    Command { op: String, message: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Rollback errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RollbackError {
    #[error("no ledger entry matches {0}")]
    NotFound(String),

    #[error("action {0} has no snapshot to roll back to")]
    NoSnapshot(String),

    #[error("action {0} was already rolled back")]
    AlreadyApplied(String),

    #[error("a rollback for action {0} is already in progress")]
    InProgress(String),

    #[error("revert to snapshot {snapshot_id} failed: {source}")]
    RevertFailed {
        snapshot_id: String,
        #[source]
        source: SnapshotError,
    },

    /// The rollback task stopped before it could finish.
    #[error("rollback of action {0} was interrupted")]
    Interrupted(String),
}

impl RollbackError {
    /// Terminal errors are user-visible and must not be retried.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::NoSnapshot(_) | Self::AlreadyApplied(_)
        )
    }
}

// ─── Persistence errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Recovered by the caller: state falls back to documented defaults.
    #[error("failed to load {path}: {message}")]
    LoadFailed { path: String, message: String },

    #[error("failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
}
