use serde_json::json;
use tempfile::TempDir;

use trustward::error::RollbackError;
use trustward::ledger::{ActionLedger, EntryState, RollbackTarget};

use super::engine_harness::{harness, harness_with_ledger};

#[tokio::test]
async fn executed_fields_never_change_after_rollback() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("ledger.jsonl");
    let h = harness_with_ledger(0.9, ActionLedger::open(&path));

    let original = h
        .engine
        .execute_tool("file_write", json!({"path": "a.txt"}), None)
        .await
        .unwrap();
    h.engine
        .rollback_action(RollbackTarget::ActionId(original.action_id.clone()), "undo")
        .await
        .unwrap();

    let reopened = ActionLedger::open(&path);
    let stored = reopened.get(&original.action_id).unwrap();
    assert_eq!(stored.tool_name, original.tool_name);
    assert_eq!(stored.args, original.args);
    assert_eq!(stored.snapshot_id, original.snapshot_id);
    assert_eq!(stored.result, original.result);
    assert_eq!(stored.state(), EntryState::RolledBack);
}

#[tokio::test]
async fn rollback_state_survives_restart() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("ledger.jsonl");

    let action_id = {
        let h = harness_with_ledger(0.9, ActionLedger::open(&path));
        let entry = h
            .engine
            .execute_tool("file_write", json!({"path": "a.txt"}), None)
            .await
            .unwrap();
        h.engine
            .rollback_action(RollbackTarget::ActionId(entry.action_id.clone()), "undo")
            .await
            .unwrap();
        entry.action_id
    };

    let h = harness_with_ledger(0.9, ActionLedger::open(&path));
    let err = h
        .engine
        .rollback_action(RollbackTarget::ActionId(action_id), "again")
        .await
        .unwrap_err();
    assert!(matches!(err, RollbackError::AlreadyApplied(_)));
    assert!((h.engine.affect().trust() - 0.9).abs() < f64::EPSILON);
}

#[tokio::test]
async fn recent_lists_newest_first() {
    let h = harness(0.5);
    for path in ["one", "two", "three"] {
        h.engine
            .execute_tool("file_read", json!({"path": path}), None)
            .await
            .unwrap();
    }
    let recent = h.engine.ledger().recent(2);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].args["path"], "three");
    assert_eq!(recent[1].args["path"], "two");
}
