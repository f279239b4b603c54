use crate::config::SyncConfig;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A record as stored on one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord<T> {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub last_modified_ms: i64,
    pub content: T,
}

impl<T> SyncRecord<T> {
    pub fn new(id: impl Into<String>, last_modified_ms: i64, content: T) -> Self {
        Self {
            id: id.into(),
            last_modified_ms,
            content,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConflictStrategy {
    #[default]
    LastWriteWins,
    ManualMerge,
}

/// Both sides of an unresolved conflict. Nothing is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord<T> {
    pub local: SyncRecord<T>,
    pub remote: SyncRecord<T>,
    pub requires_review: bool,
    pub detected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Resolution<T> {
    /// No conflict; the newer side (local on a tie).
    NoConflict(SyncRecord<T>),
    /// Conflict settled by the strategy.
    Resolved(SyncRecord<T>),
    NeedsReview(ConflictRecord<T>),
}

impl<T> Resolution<T> {
    /// The record to keep, unless a human must decide.
    pub fn into_record(self) -> Option<SyncRecord<T>> {
        match self {
            Self::NoConflict(record) | Self::Resolved(record) => Some(record),
            Self::NeedsReview(_) => None,
        }
    }

    pub fn needs_review(&self) -> bool {
        matches!(self, Self::NeedsReview(_))
    }
}

/// Two versions of the same record conflict when both were modified within
/// `window` of each other and their content differs.
pub fn detect_conflict<T: PartialEq>(
    local: &SyncRecord<T>,
    remote: &SyncRecord<T>,
    window: Duration,
) -> bool {
    if local.id != remote.id || local.content == remote.content {
        return false;
    }
    let gap = local.last_modified_ms.abs_diff(remote.last_modified_ms);
    let window_ms = u64::try_from(window.num_milliseconds()).unwrap_or(0);
    gap <= window_ms
}

fn newer<T>(local: SyncRecord<T>, remote: SyncRecord<T>) -> SyncRecord<T> {
    if remote.last_modified_ms > local.last_modified_ms {
        remote
    } else {
        local
    }
}

pub fn resolve<T: PartialEq>(
    local: SyncRecord<T>,
    remote: SyncRecord<T>,
    strategy: ConflictStrategy,
    window: Duration,
) -> Resolution<T> {
    // Different records cannot replace each other; keep both for review.
    if local.id != remote.id {
        tracing::warn!(local = %local.id, remote = %remote.id, "sync ids differ; holding both");
        return Resolution::NeedsReview(ConflictRecord {
            local,
            remote,
            requires_review: true,
            detected_at: Utc::now(),
        });
    }
    if !detect_conflict(&local, &remote, window) {
        return Resolution::NoConflict(newer(local, remote));
    }

    tracing::debug!(id = %local.id, %strategy, "sync conflict detected");
    match strategy {
        ConflictStrategy::LastWriteWins => Resolution::Resolved(newer(local, remote)),
        ConflictStrategy::ManualMerge => Resolution::NeedsReview(ConflictRecord {
            local,
            remote,
            requires_review: true,
            detected_at: Utc::now(),
        }),
    }
}

/// Outcome of merging two record sets.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport<T> {
    /// Keyed by record id.
    pub merged: BTreeMap<String, SyncRecord<T>>,
    pub conflicts: Vec<ConflictRecord<T>>,
}

/// Strategy plus window, built from `[sync]`.
#[derive(Debug, Clone, Copy)]
pub struct ConflictResolver {
    pub strategy: ConflictStrategy,
    pub window: Duration,
}

impl ConflictResolver {
    pub fn new(strategy: ConflictStrategy, window: Duration) -> Self {
        Self { strategy, window }
    }

    pub fn from_config(config: &SyncConfig, strategy: ConflictStrategy) -> Self {
        Self::new(strategy, config.conflict_window())
    }

    pub fn resolve<T: PartialEq>(&self, local: SyncRecord<T>, remote: SyncRecord<T>) -> Resolution<T> {
        resolve(local, remote, self.strategy, self.window)
    }

    /// Merge a remote set into a local one. Records on one side only are
    /// kept as-is; conflicting records needing review stay out of `merged`.
    pub fn merge<T: PartialEq>(
        &self,
        local: impl IntoIterator<Item = SyncRecord<T>>,
        remote: impl IntoIterator<Item = SyncRecord<T>>,
    ) -> MergeReport<T> {
        let mut merged: BTreeMap<String, SyncRecord<T>> = local
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        let mut conflicts = Vec::new();

        for incoming in remote {
            let Some(existing) = merged.remove(&incoming.id) else {
                merged.insert(incoming.id.clone(), incoming);
                continue;
            };
            match self.resolve(existing, incoming) {
                Resolution::NoConflict(record) | Resolution::Resolved(record) => {
                    merged.insert(record.id.clone(), record);
                }
                Resolution::NeedsReview(conflict) => conflicts.push(conflict),
            }
        }

        MergeReport { merged, conflicts }
    }
}
