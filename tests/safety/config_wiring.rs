use serde_json::json;
use tempfile::TempDir;

use trustward::Config;
use trustward::affect::AffectStore;
use trustward::config::SnapshotBackend;
use trustward::ledger::{ActionLedger, SafetyEngine};

use super::engine_harness::fake_tools;

fn config_in(tmp: &TempDir) -> Config {
    let mut config = Config::default();
    config.workspace_dir = tmp.path().join("workspace");
    config.state_dir = tmp.path().join("state");
    config.config_path = tmp.path().join("config.toml");
    config.snapshot.backend = SnapshotBackend::Disabled;
    config
}

#[tokio::test]
async fn engine_from_config_persists_ledger_and_reads_affect() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(&tmp);
    AffectStore::new(config.affect_state_path())
        .save(&trustward::affect::AffectState::default().with_trust(0.88))
        .unwrap();

    let engine = SafetyEngine::from_config(&config, fake_tools());
    assert!((engine.affect().trust() - 0.88).abs() < 1e-9);

    let entry = engine
        .execute_tool("file_write", json!({"path": "a"}), None)
        .await
        .unwrap();
    // Partner tier wants a snapshot, but the backend is disabled.
    assert!(entry.snapshot_id.is_none());
    assert!(entry.snapshot_error.is_some());
    assert!(entry.result.is_success());

    let reopened = ActionLedger::open(config.ledger_path());
    assert_eq!(reopened.len(), 1);
}

#[tokio::test]
async fn scratch_dirs_from_config_reach_the_policy() {
    let tmp = TempDir::new().unwrap();
    let mut config = config_in(&tmp);
    config.advisory.scratch_dirs = vec!["drafts".into()];

    let engine = SafetyEngine::from_config(&config, fake_tools());
    engine.affect().update_trust(1.0);
    engine.affect().update_trust(1.0);
    assert_eq!(engine.tier(), trustward::security::Tier::Associate);

    let entry = engine
        .execute_tool("file_write", json!({"path": "drafts/plan.md"}), None)
        .await
        .unwrap();
    assert_eq!(
        entry.advisory_recommendation,
        trustward::security::Recommendation::Allow
    );
    assert!(engine.ledger().overrides().is_empty());
}
