#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};

use trustward::affect::{AffectModel, AffectState};
use trustward::config::{AffectConfig, ToolsConfig};
use trustward::ledger::{ActionLedger, InMemorySnapshotter, SafetyEngine, SnapshotProvider};
use trustward::tools::{FnTool, ToolOutcome, ToolRegistry};

/// Fake tools covering each contract shape.
pub fn fake_tools() -> ToolRegistry {
    let mut tools = ToolRegistry::new(&ToolsConfig::default());
    tools.register(Box::new(FnTool::new(
        "file_write",
        "pretend to write a file",
        |args: &Value| Ok(ToolOutcome::success(json!({"written": args["path"], "bytes": 5}))),
    )));
    tools.register(Box::new(FnTool::new(
        "write_file",
        "unregistered-contract write",
        |_: &Value| Ok(ToolOutcome::success("ok")),
    )));
    tools.register(Box::new(FnTool::new("file_read", "read", |_: &Value| {
        Ok(ToolOutcome::success("hello"))
    })));
    tools.register(Box::new(FnTool::new("shell_exec", "run", |args: &Value| {
        let command = args["command"].as_str().unwrap_or_default();
        if command.contains("rm -rf") {
            Ok(ToolOutcome::success(json!({
                "exit_code": 1,
                "stderr": "rm: cannot remove 'src': Permission denied"
            })))
        } else {
            Ok(ToolOutcome::success(json!({"exit_code": 0, "stdout": ""})))
        }
    })));
    tools
}

pub struct Harness {
    pub engine: Arc<SafetyEngine>,
    pub snapshots: Arc<InMemorySnapshotter>,
}

pub fn harness(trust: f64) -> Harness {
    harness_with_ledger(trust, ActionLedger::in_memory())
}

pub fn harness_with_ledger(trust: f64, ledger: ActionLedger) -> Harness {
    let snapshots = Arc::new(InMemorySnapshotter::new());
    let affect = Arc::new(AffectModel::new(
        AffectState::default().with_trust(trust),
        AffectConfig::default(),
    ));
    let engine = SafetyEngine::new(
        affect,
        fake_tools(),
        Arc::new(ledger),
        Arc::clone(&snapshots) as Arc<dyn SnapshotProvider>,
    );
    Harness {
        engine: Arc::new(engine),
        snapshots,
    }
}
