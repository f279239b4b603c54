use trustward::Config;
use trustward::affect::{AffectState, Posture};
use trustward::ledger::{ActionLogEntry, EntryState};

pub fn render_status(config: &Config, state: &AffectState, ledger: &[ActionLogEntry]) -> String {
    let tier = state.tier();
    let offered = ledger.iter().filter(|e| e.awaiting_rollback()).count();
    let rolled_back = ledger
        .iter()
        .filter(|e| e.state() == EntryState::RolledBack)
        .count();

    let mut lines = vec![
        "◆ trustward status".to_string(),
        String::new(),
        format!("Version     {}", env!("CARGO_PKG_VERSION")),
        format!("Workspace   {}", config.workspace_dir.display()),
        format!("Config      {}", config.config_path.display()),
        format!("Snapshots   {}", config.snapshot.backend),
        String::new(),
        format!("  Trust       {:.3}  ({tier})", state.trust()),
        format!("  Warmth      {:.3}", state.warmth()),
        format!("  Arousal     {:.3}", state.arousal()),
        format!("  Valence     {:+.3}", state.valence()),
        format!(
            "  Posture     {} (suggested {})",
            state.posture(),
            Posture::for_tier(tier)
        ),
        format!(
            "  Last seen   {}",
            state.last_interaction_at().format("%Y-%m-%d %H:%M:%S UTC")
        ),
    ];

    let mut flags = Vec::new();
    if state.elastic_mode() {
        flags.push("elastic");
    }
    if state.is_slumber(&config.affect) {
        flags.push("slumber");
    }
    if state.is_crisis(&config.affect) {
        flags.push("crisis");
    }
    if !flags.is_empty() {
        lines.push(format!("  Flags       {}", flags.join(", ")));
    }

    lines.push(String::new());
    lines.push(format!(
        "Ledger      {} entries, {offered} awaiting rollback, {rolled_back} rolled back",
        ledger.len()
    ));
    lines.join("\n")
}

pub fn render_entry(entry: &ActionLogEntry) -> String {
    let snapshot = entry
        .snapshot_id
        .as_deref()
        .map_or_else(|| "-".to_string(), |id| id.chars().take(12).collect());
    let mut line = format!(
        "{}  {}  {:<14} {:<10} {:<11} snap={snapshot}  {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.action_id,
        entry.tool_name,
        entry.tier,
        entry.advisory_recommendation,
        entry.state(),
    );
    if let Some(reason) = &entry.harm_detected {
        line.push_str(&format!("\n    harm: {reason}"));
    }
    if let Some(error) = &entry.snapshot_error {
        line.push_str(&format!("\n    snapshot failed: {error}"));
    }
    line.push_str(&format!("\n    result: {}", entry.result.summary(100)));
    line
}
