use super::entry::ActionLogEntry;
use crate::error::{PersistenceError, RollbackError};
use crate::security::OverrideRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt;

/// How a rollback request names its entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackTarget {
    ActionId(String),
    SnapshotId(String),
}

impl std::fmt::Display for RollbackTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ActionId(id) => write!(f, "action {id}"),
            Self::SnapshotId(id) => write!(f, "snapshot {id}"),
        }
    }
}

/// One line of `ledger.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum LedgerRecord {
    Entry(ActionLogEntry),
    Flag {
        action_id: String,
        reason: String,
        recorded_at: DateTime<Utc>,
    },
    Rollback {
        action_id: String,
        new_snapshot_id: Option<String>,
        explanation: String,
        recorded_at: DateTime<Utc>,
    },
    Override(OverrideRecord),
}

#[derive(Debug, Default)]
struct LedgerIndex {
    entries: Vec<ActionLogEntry>,
    by_action: HashMap<String, usize>,
    by_snapshot: HashMap<String, usize>,
    claims: HashSet<String>,
    overrides: Vec<OverrideRecord>,
}

impl LedgerIndex {
    fn lookup(&self, target: &RollbackTarget) -> Option<usize> {
        match target {
            RollbackTarget::ActionId(id) => self.by_action.get(id).copied(),
            RollbackTarget::SnapshotId(id) => self.by_snapshot.get(id).copied(),
        }
    }

    fn cloned(&self, action_id: &str) -> Option<ActionLogEntry> {
        let idx = *self.by_action.get(action_id)?;
        self.entries.get(idx).cloned()
    }

    fn entry_mut(&mut self, action_id: &str) -> Option<&mut ActionLogEntry> {
        let idx = *self.by_action.get(action_id)?;
        self.entries.get_mut(idx)
    }

    /// Returns false when the record references an unknown entry.
    fn apply(&mut self, record: LedgerRecord) -> bool {
        match record {
            LedgerRecord::Entry(entry) => {
                if self.by_action.contains_key(&entry.action_id) {
                    return false;
                }
                let idx = self.entries.len();
                self.by_action.insert(entry.action_id.clone(), idx);
                if let Some(snapshot_id) = entry.snapshot_id.as_ref().filter(|id| !id.is_empty()) {
                    self.by_snapshot.insert(snapshot_id.clone(), idx);
                }
                self.entries.push(entry);
                true
            }
            LedgerRecord::Flag {
                action_id, reason, ..
            } => {
                let Some(entry) = self.entry_mut(&action_id) else {
                    return false;
                };
                if entry.harm_detected.is_none() {
                    entry.harm_detected = Some(reason);
                }
                entry.rollback_offered |= entry.has_snapshot();
                true
            }
            LedgerRecord::Rollback {
                action_id,
                new_snapshot_id,
                explanation,
                ..
            } => {
                let Some(entry) = self.entry_mut(&action_id) else {
                    return false;
                };
                if !entry.rollback_applied {
                    entry.rollback_applied = true;
                    entry.rollback_snapshot_id = new_snapshot_id;
                    entry.rollback_explanation = Some(explanation);
                }
                true
            }
            LedgerRecord::Override(record) => {
                self.overrides.push(record);
                true
            }
        }
    }
}

/// Append-only action ledger.
///
/// Every mutation is written to the JSONL file before the in-memory index
/// changes, so the index never holds state the file does not. Without a
/// backing file the ledger is memory-only.
#[derive(Debug)]
pub struct ActionLedger {
    path: Option<PathBuf>,
    index: Mutex<LedgerIndex>,
    writer: tokio::sync::Mutex<()>,
}

impl ActionLedger {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            index: Mutex::new(LedgerIndex::default()),
            writer: tokio::sync::Mutex::new(()),
        }
    }

    /// Replay the ledger file. Malformed lines are skipped and an unreadable
    /// file yields an empty ledger; both with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let index = match Self::replay(&path) {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("Starting with an empty action ledger: {e}");
                LedgerIndex::default()
            }
        };
        tracing::debug!(
            path = %path.display(),
            entries = index.entries.len(),
            "action ledger loaded"
        );
        Self {
            path: Some(path),
            index: Mutex::new(index),
            writer: tokio::sync::Mutex::new(()),
        }
    }

    fn replay(path: &Path) -> Result<LedgerIndex, PersistenceError> {
        let mut index = LedgerIndex::default();
        if !path.exists() {
            return Ok(index);
        }

        let raw = std::fs::read_to_string(path).map_err(|e| PersistenceError::LoadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        for (line_no, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LedgerRecord>(line) {
                Ok(record) => {
                    if !index.apply(record) {
                        tracing::warn!(line = line_no + 1, "ledger record does not apply; skipped");
                    }
                }
                Err(e) => {
                    tracing::warn!(line = line_no + 1, "malformed ledger line skipped: {e}");
                }
            }
        }
        Ok(index)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock_index(&self) -> std::sync::MutexGuard<'_, LedgerIndex> {
        self.index
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn persist(&self, record: &LedgerRecord) -> Result<(), PersistenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let write_err = |e: std::io::Error| PersistenceError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(write_err)?;
        file.write_all(line.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;
        Ok(())
    }

    /// Durably append a completed entry.
    pub async fn append(&self, entry: &ActionLogEntry) -> Result<(), PersistenceError> {
        let _writer = self.writer.lock().await;
        let duplicate = self.lock_index().by_action.contains_key(&entry.action_id);
        if duplicate {
            return Err(PersistenceError::Write {
                path: self.describe_path(),
                message: format!("duplicate action id {}", entry.action_id),
            });
        }

        let record = LedgerRecord::Entry(entry.clone());
        self.persist(&record).await?;
        self.lock_index().apply(record);
        Ok(())
    }

    /// Mark harm on an existing entry after the fact. Idempotent: a second
    /// flag keeps the first reason.
    pub async fn flag_harm(
        &self,
        action_id: &str,
        reason: &str,
    ) -> Result<ActionLogEntry, RollbackError> {
        let _writer = self.writer.lock().await;
        {
            let index = self.lock_index();
            let idx = index
                .by_action
                .get(action_id)
                .copied()
                .ok_or_else(|| RollbackError::NotFound(action_id.to_string()))?;
            let entry = &index.entries[idx];
            if entry.harm_detected.is_some() {
                return Ok(entry.clone());
            }
        }

        let record = LedgerRecord::Flag {
            action_id: action_id.to_string(),
            reason: reason.to_string(),
            recorded_at: Utc::now(),
        };
        self.persist(&record).await?;

        let mut index = self.lock_index();
        index.apply(record);
        index
            .cloned(action_id)
            .ok_or_else(|| RollbackError::NotFound(action_id.to_string()))
    }

    pub async fn record_override(&self, record: &OverrideRecord) -> Result<(), PersistenceError> {
        let _writer = self.writer.lock().await;
        let record = LedgerRecord::Override(record.clone());
        self.persist(&record).await?;
        self.lock_index().apply(record);
        Ok(())
    }

    /// Atomically check and claim an entry for rollback.
    ///
    /// The claim is released when the returned guard drops, unless
    /// [`RollbackClaim::complete`] recorded the rollback first.
    pub fn claim_rollback(
        self: &Arc<Self>,
        target: &RollbackTarget,
    ) -> Result<RollbackClaim, RollbackError> {
        let mut index = self.lock_index();
        let idx = index
            .lookup(target)
            .ok_or_else(|| RollbackError::NotFound(target.to_string()))?;
        let entry = index.entries[idx].clone();

        if !entry.has_snapshot() {
            return Err(RollbackError::NoSnapshot(entry.action_id));
        }
        if entry.rollback_applied {
            return Err(RollbackError::AlreadyApplied(entry.action_id));
        }
        if !index.claims.insert(entry.action_id.clone()) {
            return Err(RollbackError::InProgress(entry.action_id));
        }

        Ok(RollbackClaim {
            ledger: Arc::clone(self),
            entry,
            settled: false,
        })
    }

    fn release_claim(&self, action_id: &str) {
        self.lock_index().claims.remove(action_id);
    }

    pub fn get(&self, action_id: &str) -> Option<ActionLogEntry> {
        self.lock_index().cloned(action_id)
    }

    pub fn find_by_snapshot(&self, snapshot_id: &str) -> Option<ActionLogEntry> {
        let index = self.lock_index();
        index
            .by_snapshot
            .get(snapshot_id)
            .map(|&idx| index.entries[idx].clone())
    }

    /// Newest first.
    pub fn recent(&self, limit: usize) -> Vec<ActionLogEntry> {
        self.lock_index()
            .entries
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Oldest first.
    pub fn entries(&self) -> Vec<ActionLogEntry> {
        self.lock_index().entries.clone()
    }

    pub fn overrides(&self) -> Vec<OverrideRecord> {
        self.lock_index().overrides.clone()
    }

    pub fn len(&self) -> usize {
        self.lock_index().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn describe_path(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string())
    }
}

/// Exclusive right to roll back one entry.
#[derive(Debug)]
pub struct RollbackClaim {
    ledger: Arc<ActionLedger>,
    entry: ActionLogEntry,
    settled: bool,
}

impl RollbackClaim {
    pub fn entry(&self) -> &ActionLogEntry {
        &self.entry
    }

    /// Record the applied rollback. The entry is marked applied in memory
    /// even when the write fails, so the penalty cannot be charged twice in
    /// this process; the error tells the caller the file is behind.
    pub async fn complete(
        mut self,
        new_snapshot_id: Option<&str>,
        explanation: &str,
    ) -> (ActionLogEntry, Result<(), PersistenceError>) {
        let ledger = Arc::clone(&self.ledger);
        let _writer = ledger.writer.lock().await;
        let record = LedgerRecord::Rollback {
            action_id: self.entry.action_id.clone(),
            new_snapshot_id: new_snapshot_id.map(str::to_string),
            explanation: explanation.to_string(),
            recorded_at: Utc::now(),
        };
        let persisted = ledger.persist(&record).await;

        let mut index = ledger.lock_index();
        index.apply(record);
        index.claims.remove(&self.entry.action_id);
        self.settled = true;
        let updated = index
            .cloned(&self.entry.action_id)
            .unwrap_or_else(|| self.entry.clone());
        (updated, persisted)
    }
}

impl Drop for RollbackClaim {
    fn drop(&mut self) {
        if !self.settled {
            self.ledger.release_claim(&self.entry.action_id);
        }
    }
}
