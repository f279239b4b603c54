mod path;
mod trackers;
mod types;

pub use trackers::OverrideTracker;
pub use types::{ActionType, OverrideRecord, PermissionCheck, Recommendation};

use crate::config::AdvisoryConfig;
use crate::security::Tier;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Baseline advisory table before configuration overrides.
pub fn baseline(tier: Tier, action: &ActionType) -> Recommendation {
    use Recommendation::{Allow, Caution, Restriction};

    match (action, tier) {
        (ActionType::Read, _) => Allow,

        (ActionType::Write, Tier::Stranger | Tier::Associate) => Restriction,
        (ActionType::Write, Tier::Partner | Tier::Surrogate) => Allow,

        (ActionType::ShellExec, Tier::Stranger) => Restriction,
        (ActionType::ShellExec, Tier::Associate | Tier::Partner) => Caution,
        (ActionType::ShellExec, Tier::Surrogate) => Allow,

        (ActionType::Network, Tier::Stranger) => Restriction,
        (ActionType::Network, Tier::Associate) => Caution,
        (ActionType::Network, Tier::Partner | Tier::Surrogate) => Allow,

        (ActionType::Other(_), Tier::Surrogate) => Allow,
        (ActionType::Other(_), Tier::Partner) => Caution,
        (ActionType::Other(_), Tier::Stranger | Tier::Associate) => Restriction,
    }
}

/// Non-blocking advisory policy. Every check is permitted; the
/// recommendation travels with the ledger entry.
#[derive(Debug, Clone)]
pub struct AdvisoryPolicy {
    pub workspace_dir: PathBuf,
    pub scratch_dirs: Vec<PathBuf>,
    pub overrides: HashMap<(Tier, ActionType), Recommendation>,
    pub tracker: OverrideTracker,
}

impl Default for AdvisoryPolicy {
    fn default() -> Self {
        Self::from_config(&AdvisoryConfig::default(), Path::new("."))
    }
}

impl AdvisoryPolicy {
    /// Build from config sections
    pub fn from_config(config: &AdvisoryConfig, workspace_dir: &Path) -> Self {
        Self {
            workspace_dir: workspace_dir.to_path_buf(),
            scratch_dirs: config
                .scratch_dirs
                .iter()
                .map(|dir| PathBuf::from(dir.trim().trim_end_matches('/')))
                .collect(),
            overrides: config
                .overrides
                .iter()
                .map(|o| ((o.tier, o.action.clone()), o.recommendation))
                .collect(),
            tracker: OverrideTracker::new(),
        }
    }

    /// Table lookup: configured override, else baseline.
    pub fn recommend(&self, tier: Tier, action: &ActionType) -> Recommendation {
        self.overrides
            .get(&(tier, action.clone()))
            .copied()
            .unwrap_or_else(|| baseline(tier, action))
    }

    /// Like [`recommend`](Self::recommend), but an Associate write into a
    /// scratch directory is allowed unless an override says otherwise.
    pub fn recommend_for_target(
        &self,
        tier: Tier,
        action: &ActionType,
        target: Option<&str>,
    ) -> Recommendation {
        if tier == Tier::Associate
            && *action == ActionType::Write
            && !self.overrides.contains_key(&(tier, action.clone()))
            && target.is_some_and(|t| self.is_scratch_target(t))
        {
            return Recommendation::Allow;
        }
        self.recommend(tier, action)
    }

    /// Always permitted. Never fails.
    pub fn check_permission(
        &self,
        tier: Tier,
        action: &ActionType,
        target: Option<&str>,
    ) -> PermissionCheck {
        let recommendation = self.recommend_for_target(tier, action, target);
        let reason = match recommendation {
            Recommendation::Allow => format!("{action} is within {tier} latitude"),
            Recommendation::Caution => format!("{action} at {tier} tier warrants caution"),
            Recommendation::Restriction => {
                format!("{action} is advised against at {tier} tier")
            }
        };
        tracing::debug!(
            tier = %tier,
            action = %action,
            recommendation = %recommendation,
            "advisory permission check"
        );
        PermissionCheck {
            permitted: true,
            tier,
            action: action.clone(),
            recommendation,
            reason,
        }
    }

    /// Record that execution went ahead despite a non-`Allow`
    /// recommendation. Feeds analytics only; never alters the call.
    pub fn log_override(
        &self,
        tier: Tier,
        action: &ActionType,
        recommendation: Recommendation,
        reason: &str,
        target: Option<&str>,
    ) -> OverrideRecord {
        let record = OverrideRecord {
            recorded_at: Utc::now(),
            action_id: None,
            tier,
            action: action.clone(),
            recommendation,
            reason: reason.to_string(),
            target: target.map(str::to_string),
        };
        let count = self.tracker.record(&record);
        tracing::info!(
            tier = %tier,
            action = %action,
            recommendation = %recommendation,
            reason,
            overrides_in_bucket = count,
            "advisory overridden"
        );
        record
    }
}

#[cfg(test)]
mod tests;
