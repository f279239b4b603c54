use super::types::{ActionType, OverrideRecord};
use crate::security::Tier;
use std::collections::HashMap;
use std::sync::Mutex;

/// Per-(tier, action) counts of executions that went ahead against advice.
#[derive(Debug)]
pub struct OverrideTracker {
    counts: Mutex<HashMap<(Tier, ActionType), usize>>,
}

impl OverrideTracker {
    pub fn new() -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// Record an override and return the updated count for its bucket.
    pub fn record(&self, record: &OverrideRecord) -> usize {
        let mut counts = self
            .counts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let count = counts
            .entry((record.tier, record.action.clone()))
            .or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, tier: Tier, action: &ActionType) -> usize {
        let counts = self
            .counts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        counts.get(&(tier, action.clone())).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        let counts = self
            .counts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        counts.values().sum()
    }

    /// All non-empty buckets, sorted by tier then action name.
    pub fn summary(&self) -> Vec<(Tier, ActionType, usize)> {
        let counts = self
            .counts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut rows: Vec<(Tier, ActionType, usize)> = counts
            .iter()
            .map(|((tier, action), count)| (*tier, action.clone(), *count))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.as_str().cmp(b.1.as_str())));
        rows
    }
}

impl Clone for OverrideTracker {
    fn clone(&self) -> Self {
        let counts = self
            .counts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Self {
            counts: Mutex::new(counts.clone()),
        }
    }
}
