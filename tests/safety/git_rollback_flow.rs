use std::sync::Arc;

use serde_json::{Value, json};
use tempfile::TempDir;

use trustward::affect::{AffectModel, AffectState};
use trustward::config::{AffectConfig, ToolsConfig};
use trustward::ledger::{ActionLedger, GitSnapshotter, RollbackTarget, SafetyEngine};
use trustward::tools::{FnTool, ToolOutcome, ToolRegistry};

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success())
}

#[tokio::test]
async fn harmful_write_is_reverted_on_disk() {
    if !git_available() {
        return;
    }
    let workspace = TempDir::new().unwrap();
    let file = workspace.path().join("config.ini");
    std::fs::write(&file, "mode=safe\n").unwrap();

    let root = workspace.path().to_path_buf();
    let mut tools = ToolRegistry::new(&ToolsConfig::default());
    tools.register(Box::new(FnTool::new(
        "file_write",
        "write a file in the workspace",
        move |args: &Value| {
            let path = root.join(args["path"].as_str().unwrap_or("out.txt"));
            std::fs::write(&path, args["content"].as_str().unwrap_or_default())?;
            Ok(ToolOutcome::success("error: wrote truncated content"))
        },
    )));

    let engine = SafetyEngine::new(
        Arc::new(AffectModel::new(
            AffectState::default().with_trust(0.92),
            AffectConfig::default(),
        )),
        tools,
        Arc::new(ActionLedger::in_memory()),
        Arc::new(GitSnapshotter::new(workspace.path())),
    );

    let entry = engine
        .execute_tool("file_write", json!({"path": "config.ini", "content": "mo"}), None)
        .await
        .unwrap();
    assert!(entry.rollback_offered);
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "mo");

    let result = engine
        .rollback_action(RollbackTarget::ActionId(entry.action_id), "truncated file")
        .await
        .unwrap();
    assert_ne!(result.new_snapshot, result.original_snapshot);
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "mode=safe\n");
}
