use super::entry::ActionLogEntry;
use super::harm::{HarmDetector, KeywordHarmDetector};
use super::notify::{ActionNotice, ActionNotifier, LogNotifier};
use super::snapshot::{self, SnapshotProvider};
use super::store::{ActionLedger, RollbackClaim, RollbackTarget};
use crate::affect::{AffectModel, AffectStore};
use crate::config::Config;
use crate::error::{RollbackError, ToolError};
use crate::security::{
    ActionType, AdvisoryPolicy, OverrideRecord, PermissionCheck, Recommendation, Tier,
};
use crate::tools::{ToolOutcome, ToolRegistry};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Trust deducted for every applied rollback.
pub const ROLLBACK_TRUST_PENALTY: f64 = 0.02;

const TARGET_ARG_KEYS: [&str; 3] = ["path", "command", "url"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RollbackStatus {
    Success,
    /// Reverted and penalized, but the ledger file could not record it.
    SuccessUnrecorded,
}

#[derive(Debug, Clone, Serialize)]
pub struct RollbackResult {
    pub status: RollbackStatus,
    pub action_id: String,
    pub original_snapshot: String,
    pub new_snapshot: String,
    pub trust_penalty: f64,
    pub trust_after: f64,
}

/// Wraps tool execution with advisory checks, snapshots, harm detection,
/// the action ledger and rollback.
pub struct SafetyEngine {
    affect: Arc<AffectModel>,
    affect_store: Option<AffectStore>,
    policy: AdvisoryPolicy,
    tools: ToolRegistry,
    ledger: Arc<ActionLedger>,
    snapshots: Arc<dyn SnapshotProvider>,
    harm: Arc<dyn HarmDetector>,
    notifier: Arc<dyn ActionNotifier>,
    session: Arc<tokio::sync::Mutex<()>>,
}

impl std::fmt::Debug for SafetyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafetyEngine")
            .field("affect", &self.affect)
            .field("tools", &self.tools.tool_names())
            .field("snapshots", &self.snapshots.name())
            .field("ledger_entries", &self.ledger.len())
            .finish_non_exhaustive()
    }
}

impl SafetyEngine {
    pub fn new(
        affect: Arc<AffectModel>,
        tools: ToolRegistry,
        ledger: Arc<ActionLedger>,
        snapshots: Arc<dyn SnapshotProvider>,
    ) -> Self {
        Self {
            affect,
            affect_store: None,
            policy: AdvisoryPolicy::default(),
            tools,
            ledger,
            snapshots,
            harm: Arc::new(KeywordHarmDetector::default()),
            notifier: Arc::new(LogNotifier),
            session: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Wire everything from configuration: persisted affect state, the
    /// ledger file, the configured snapshot backend and harm keywords.
    pub fn from_config(config: &Config, tools: ToolRegistry) -> Self {
        let store = AffectStore::new(config.affect_state_path());
        let affect = Arc::new(AffectModel::new(
            store.load_or_default(),
            config.affect.clone(),
        ));
        let ledger = Arc::new(ActionLedger::open(config.ledger_path()));

        Self::new(affect, tools, ledger, snapshot::from_config(config))
            .with_policy(AdvisoryPolicy::from_config(
                &config.advisory,
                &config.workspace_dir,
            ))
            .with_harm_detector(Arc::new(KeywordHarmDetector::from_config(&config.harm)))
            .with_affect_store(store)
    }

    #[must_use]
    pub fn with_policy(mut self, policy: AdvisoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_harm_detector(mut self, harm: Arc<dyn HarmDetector>) -> Self {
        self.harm = harm;
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn ActionNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Persist affect state after trust penalties.
    #[must_use]
    pub fn with_affect_store(mut self, store: AffectStore) -> Self {
        self.affect_store = Some(store);
        self
    }

    pub fn affect(&self) -> &Arc<AffectModel> {
        &self.affect
    }

    pub fn ledger(&self) -> &Arc<ActionLedger> {
        &self.ledger
    }

    pub fn policy(&self) -> &AdvisoryPolicy {
        &self.policy
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn tier(&self) -> Tier {
        self.affect.tier()
    }

    /// Advisory check at the current tier. Always permitted.
    pub fn check_permission(&self, action: &ActionType, target: Option<&str>) -> PermissionCheck {
        self.policy.check_permission(self.tier(), action, target)
    }

    /// Record an override at the current tier, in memory and in the ledger.
    pub async fn log_override(
        &self,
        action: &ActionType,
        recommendation: Recommendation,
        reason: &str,
        target: Option<&str>,
    ) -> OverrideRecord {
        let record = self
            .policy
            .log_override(self.tier(), action, recommendation, reason, target);
        if let Err(e) = self.ledger.record_override(&record).await {
            tracing::warn!("override not persisted: {e}");
        }
        record
    }

    pub async fn execute_tool(
        &self,
        tool_name: &str,
        args: Value,
        override_reason: Option<&str>,
    ) -> Result<ActionLogEntry, ToolError> {
        self.execute_tool_cancellable(tool_name, args, override_reason, CancellationToken::new())
            .await
    }

    /// Run a tool under the ledger. Advisory output never stops the tool;
    /// a failed snapshot never stops it either.
    ///
    /// If `cancel` fires once the snapshot phase is over, an aborted entry
    /// is appended and [`ToolError::Aborted`] returned. Dropping the future
    /// before the append leaves no entry at all.
    pub async fn execute_tool_cancellable(
        &self,
        tool_name: &str,
        args: Value,
        override_reason: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<ActionLogEntry, ToolError> {
        let _session = self.session.lock().await;

        let registered = self.tools.get(tool_name).ok_or_else(|| ToolError::NotFound {
            name: tool_name.to_string(),
        })?;
        let contract = &registered.contract;
        let action_id = uuid::Uuid::new_v4().to_string();
        let tier = self.affect.tier();
        let target = extract_target(&args);

        let check = self
            .policy
            .check_permission(tier, &contract.action_type, target.as_deref());
        if check.recommendation != Recommendation::Allow {
            let mut record = self.policy.log_override(
                tier,
                &contract.action_type,
                check.recommendation,
                override_reason.unwrap_or("unspecified"),
                target.as_deref(),
            );
            record.action_id = Some(action_id.clone());
            if let Err(e) = self.ledger.record_override(&record).await {
                tracing::warn!(action_id, "override not persisted: {e}");
            }
        }

        if contract.requires_notification {
            self.notifier.notify(&ActionNotice {
                action_id: &action_id,
                tool_name,
                action_type: &contract.action_type,
                tier,
                recommendation: check.recommendation,
                args: &args,
            });
        }

        let (snapshot_id, snapshot_error) =
            if tier.requires_snapshots() && (contract.requires_snapshot || registered.mutating) {
                let label = format!("{tool_name} {action_id}");
                match self.snapshots.snapshot(&label).await {
                    Ok(id) => {
                        tracing::info!(action_id, tool = tool_name, snapshot = %id, "snapshot taken");
                        (Some(id), None)
                    }
                    Err(e) => {
                        tracing::warn!(
                            action_id,
                            tool = tool_name,
                            "snapshot failed, running without rollback safety: {e}"
                        );
                        (None, Some(e.to_string()))
                    }
                }
            } else {
                (None, None)
            };

        let executed = if cancel.is_cancelled() {
            None
        } else {
            tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                result = registered.tool.execute(args.clone()) => Some(result),
            }
        };

        let (result, aborted, executor_error) = match executed {
            None => (ToolOutcome::failure("cancelled"), true, None),
            Some(Ok(outcome)) => (outcome, false, None),
            Some(Err(e)) => (ToolOutcome::failure(format!("{e:#}")), false, Some(e)),
        };

        let harm = if aborted {
            None
        } else {
            self.harm.detect_harm(tool_name, &result, &args)
        };
        let rollback_offered = harm.is_some() && snapshot_id.is_some();
        if let Some(reason) = &harm {
            tracing::warn!(action_id, tool = tool_name, rollback_offered, "harm detected: {reason}");
        }

        let entry = ActionLogEntry {
            action_id: action_id.clone(),
            timestamp: Utc::now(),
            action_type: contract.action_type.clone(),
            tool_name: tool_name.to_string(),
            args,
            tier,
            snapshot_id,
            snapshot_error,
            advisory_recommendation: check.recommendation,
            override_reason: override_reason.map(str::to_string),
            result,
            aborted,
            rollback_offered,
            harm_detected: if rollback_offered { harm } else { None },
            rollback_applied: false,
            rollback_snapshot_id: None,
            rollback_explanation: None,
        };
        self.ledger.append(&entry).await?;

        tracing::info!(
            action_id,
            tool = tool_name,
            tier = %tier,
            recommendation = %check.recommendation,
            state = %entry.state(),
            "tool executed"
        );

        if aborted {
            return Err(ToolError::Aborted {
                name: tool_name.to_string(),
                action_id,
            });
        }
        if let Some(e) = executor_error {
            return Err(ToolError::Execution {
                name: tool_name.to_string(),
                action_id,
                message: format!("{e:#}"),
            });
        }
        Ok(entry)
    }

    /// Revert an entry's snapshot and charge the fixed trust penalty,
    /// exactly once per entry.
    ///
    /// Once the entry is claimed, the revert, the ledger record and the
    /// penalty run on a spawned task. Dropping this future does not cancel
    /// them, so the tree and the ledger cannot disagree.
    pub async fn rollback_action(
        &self,
        target: RollbackTarget,
        explanation: &str,
    ) -> Result<RollbackResult, RollbackError> {
        let session = Arc::clone(&self.session).lock_owned().await;

        let claim = self.ledger.claim_rollback(&target)?;
        let action_id = claim.entry().action_id.clone();
        let job = RollbackJob {
            claim,
            snapshots: Arc::clone(&self.snapshots),
            affect: Arc::clone(&self.affect),
            affect_store: self.affect_store.clone(),
            explanation: explanation.to_string(),
        };

        let handle = tokio::spawn(async move {
            let _session = session;
            job.run().await
        });
        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(RollbackError::Interrupted(action_id)),
        }
    }

    /// Save affect state if a store is attached. Failures only warn.
    pub fn persist_affect(&self) {
        save_affect(self.affect_store.as_ref(), &self.affect);
    }
}

/// Everything a rollback needs once its entry is claimed.
struct RollbackJob {
    claim: RollbackClaim,
    snapshots: Arc<dyn SnapshotProvider>,
    affect: Arc<AffectModel>,
    affect_store: Option<AffectStore>,
    explanation: String,
}

impl RollbackJob {
    async fn run(self) -> Result<RollbackResult, RollbackError> {
        let action_id = self.claim.entry().action_id.clone();
        let original_snapshot = self.claim.entry().snapshot_id.clone().unwrap_or_default();

        let new_snapshot = self
            .snapshots
            .revert(&original_snapshot)
            .await
            .map_err(|source| {
                tracing::warn!(action_id, snapshot = %original_snapshot, "revert failed: {source}");
                RollbackError::RevertFailed {
                    snapshot_id: original_snapshot.clone(),
                    source,
                }
            })?;

        let (_, recorded) = self
            .claim
            .complete(Some(&new_snapshot), &self.explanation)
            .await;
        let status = match recorded {
            Ok(()) => RollbackStatus::Success,
            Err(e) => {
                tracing::warn!(action_id, "rollback applied but not persisted: {e}");
                RollbackStatus::SuccessUnrecorded
            }
        };

        let trust_after = self.affect.apply_penalty(ROLLBACK_TRUST_PENALTY);
        save_affect(self.affect_store.as_ref(), &self.affect);

        tracing::info!(
            action_id,
            original_snapshot = %original_snapshot,
            new_snapshot = %new_snapshot,
            trust_after,
            "rollback applied"
        );

        Ok(RollbackResult {
            status,
            action_id,
            original_snapshot,
            new_snapshot,
            trust_penalty: ROLLBACK_TRUST_PENALTY,
            trust_after,
        })
    }
}

fn save_affect(store: Option<&AffectStore>, affect: &AffectModel) {
    if let Some(store) = store
        && let Err(e) = store.save(&affect.snapshot())
    {
        tracing::warn!("affect state not persisted: {e}");
    }
}

fn extract_target(args: &Value) -> Option<String> {
    TARGET_ARG_KEYS
        .iter()
        .find_map(|key| args.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
