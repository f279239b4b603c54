use serde_json::json;

use trustward::security::{Recommendation, Tier};

use super::engine_harness::harness;

#[tokio::test]
async fn every_tier_runs_every_tool() {
    for trust in [0.0, 0.65, 0.85, 0.95] {
        let h = harness(trust);
        for (tool, args) in [
            ("file_read", json!({"path": "a"})),
            ("file_write", json!({"path": "a"})),
            ("shell_exec", json!({"command": "ls"})),
            ("write_file", json!({"path": "a"})),
        ] {
            let entry = h.engine.execute_tool(tool, args, None).await.unwrap();
            assert!(
                entry.result.is_success(),
                "{tool} did not run at trust {trust}"
            );
        }
        assert_eq!(h.engine.ledger().len(), 4);
    }
}

#[tokio::test]
async fn non_allow_executions_are_counted_as_overrides() {
    let h = harness(0.1);
    h.engine
        .execute_tool("shell_exec", json!({"command": "ls"}), Some("needed a listing"))
        .await
        .unwrap();
    h.engine
        .execute_tool("file_read", json!({"path": "a"}), None)
        .await
        .unwrap();

    let overrides = h.engine.ledger().overrides();
    assert_eq!(overrides.len(), 1);
    assert_eq!(overrides[0].recommendation, Recommendation::Restriction);
    assert_eq!(overrides[0].target.as_deref(), Some("ls"));
    assert_eq!(h.engine.policy().tracker.total(), 1);
    assert_eq!(overrides[0].tier, Tier::Stranger);
}

#[tokio::test]
async fn shell_failure_at_surrogate_offers_rollback() {
    let h = harness(0.95);
    let entry = h
        .engine
        .execute_tool("shell_exec", json!({"command": "rm -rf src"}), None)
        .await
        .unwrap();
    assert!(entry.rollback_offered);
    assert!(entry.harm_detected.is_some());
    assert_eq!(entry.advisory_recommendation, Recommendation::Allow);
}
