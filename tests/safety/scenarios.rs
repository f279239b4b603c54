use chrono::{Duration, Utc};
use serde_json::json;

use trustward::affect::{AffectModel, AffectState};
use trustward::config::AffectConfig;
use trustward::error::RollbackError;
use trustward::ledger::RollbackTarget;
use trustward::security::{ActionType, AdvisoryPolicy, Recommendation, Tier};
use trustward::sync::{ConflictStrategy, Resolution, SyncRecord, resolve};

use super::engine_harness::harness;

#[tokio::test]
async fn stranger_is_advised_against_writes_but_still_runs_them() {
    let h = harness(0.1);
    assert_eq!(Tier::classify(0.1), Tier::Stranger);
    assert_eq!(
        AdvisoryPolicy::default().recommend(Tier::Stranger, &ActionType::Write),
        Recommendation::Restriction
    );

    let entry = h
        .engine
        .execute_tool("file_write", json!({"path": "notes.md", "content": "hi"}), None)
        .await
        .unwrap();
    assert!(entry.result.is_success());
    assert_eq!(entry.advisory_recommendation, Recommendation::Restriction);
}

#[tokio::test]
async fn partner_file_modification_is_snapshotted() {
    let h = harness(0.85);
    let entry = h
        .engine
        .execute_tool("file_write", json!({"path": "notes.md"}), None)
        .await
        .unwrap();
    assert!(entry.snapshot_id.as_deref().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn rollback_applies_fixed_penalty() {
    let h = harness(0.85);
    let entry = h
        .engine
        .execute_tool("file_write", json!({"path": "notes.md"}), None)
        .await
        .unwrap();
    let prior = h.engine.affect().trust();

    let result = h
        .engine
        .rollback_action(RollbackTarget::ActionId(entry.action_id), "not what I asked")
        .await
        .unwrap();

    assert_eq!(result.status.to_string(), "success");
    assert_eq!(Some(result.original_snapshot), entry.snapshot_id);
    assert!((result.trust_penalty - 0.02).abs() < f64::EPSILON);
    assert!((h.engine.affect().trust() - (prior - 0.02).max(0.0)).abs() < 1e-9);
}

#[tokio::test]
async fn rollback_without_snapshot_fails_explicitly() {
    let h = harness(0.3);
    let entry = h
        .engine
        .execute_tool("file_write", json!({"path": "notes.md"}), None)
        .await
        .unwrap();
    assert!(entry.snapshot_id.is_none());

    let err = h
        .engine
        .rollback_action(RollbackTarget::ActionId(entry.action_id), "undo")
        .await
        .unwrap_err();
    assert!(matches!(err, RollbackError::NoSnapshot(_)));
}

#[test]
fn reunion_after_two_days_spikes_arousal() {
    let model = AffectModel::new(
        AffectState::default()
            .with_arousal(0.3)
            .with_last_interaction_at(Utc::now() - Duration::hours(49)),
        AffectConfig::default(),
    );
    assert!(model.check_reunion());
    assert!(model.snapshot().arousal() >= 0.85);
}

#[test]
fn last_write_wins_returns_remote() {
    let local = SyncRecord::new("pref", 1000, "dark".to_string());
    let remote = SyncRecord::new("pref", 2000, "light".to_string());
    let resolution = resolve(
        local,
        remote.clone(),
        ConflictStrategy::LastWriteWins,
        Duration::hours(1),
    );
    assert_eq!(resolution, Resolution::Resolved(remote));
}
