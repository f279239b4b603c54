use super::*;
use crate::config::AdvisoryOverride;

fn default_policy() -> AdvisoryPolicy {
    AdvisoryPolicy::default()
}

fn policy_with_overrides(overrides: Vec<AdvisoryOverride>) -> AdvisoryPolicy {
    AdvisoryPolicy::from_config(
        &AdvisoryConfig {
            overrides,
            ..AdvisoryConfig::default()
        },
        Path::new("/srv/workspace"),
    )
}

// ── Baseline table ───────────────────────────────────────

#[test]
fn read_is_always_allowed() {
    let p = default_policy();
    for tier in Tier::ALL {
        assert_eq!(p.recommend(tier, &ActionType::Read), Recommendation::Allow);
    }
}

#[test]
fn write_column_matches_table() {
    let p = default_policy();
    assert_eq!(
        p.recommend(Tier::Stranger, &ActionType::Write),
        Recommendation::Restriction
    );
    assert_eq!(
        p.recommend(Tier::Associate, &ActionType::Write),
        Recommendation::Restriction
    );
    assert_eq!(
        p.recommend(Tier::Partner, &ActionType::Write),
        Recommendation::Allow
    );
    assert_eq!(
        p.recommend(Tier::Surrogate, &ActionType::Write),
        Recommendation::Allow
    );
}

#[test]
fn shell_exec_column_matches_table() {
    let p = default_policy();
    assert_eq!(
        p.recommend(Tier::Stranger, &ActionType::ShellExec),
        Recommendation::Restriction
    );
    assert_eq!(
        p.recommend(Tier::Associate, &ActionType::ShellExec),
        Recommendation::Caution
    );
    assert_eq!(
        p.recommend(Tier::Partner, &ActionType::ShellExec),
        Recommendation::Caution
    );
    assert_eq!(
        p.recommend(Tier::Surrogate, &ActionType::ShellExec),
        Recommendation::Allow
    );
}

#[test]
fn recommendations_never_loosen_as_tier_drops() {
    let p = default_policy();
    let actions = [
        ActionType::Read,
        ActionType::Write,
        ActionType::ShellExec,
        ActionType::Network,
        ActionType::Other("deploy".into()),
    ];
    for action in &actions {
        for pair in Tier::ALL.windows(2) {
            assert!(
                p.recommend(pair[0], action) >= p.recommend(pair[1], action),
                "{action}: {} looser than {}",
                pair[0],
                pair[1]
            );
        }
    }
}

#[test]
fn unknown_action_is_never_allowed_below_surrogate() {
    let p = default_policy();
    let action = ActionType::Other("launch_rocket".into());
    assert_eq!(p.recommend(Tier::Partner, &action), Recommendation::Caution);
    assert_eq!(
        p.recommend(Tier::Stranger, &action),
        Recommendation::Restriction
    );
    assert_eq!(p.recommend(Tier::Surrogate, &action), Recommendation::Allow);
}

// ── Scratch scope ────────────────────────────────────────

#[test]
fn associate_write_inside_scratch_is_allowed() {
    let p = default_policy();
    assert_eq!(
        p.recommend_for_target(Tier::Associate, &ActionType::Write, Some("scratch/a.txt")),
        Recommendation::Allow
    );
    assert_eq!(
        p.recommend_for_target(Tier::Associate, &ActionType::Write, Some("src/a.txt")),
        Recommendation::Restriction
    );
    assert_eq!(
        p.recommend_for_target(Tier::Associate, &ActionType::Write, None),
        Recommendation::Restriction
    );
}

#[test]
fn scratch_scope_does_not_help_strangers() {
    let p = default_policy();
    assert_eq!(
        p.recommend_for_target(Tier::Stranger, &ActionType::Write, Some("scratch/a.txt")),
        Recommendation::Restriction
    );
}

// ── Overrides ────────────────────────────────────────────

#[test]
fn configured_override_replaces_cell() {
    let p = policy_with_overrides(vec![AdvisoryOverride {
        tier: Tier::Surrogate,
        action: ActionType::ShellExec,
        recommendation: Recommendation::Caution,
    }]);
    assert_eq!(
        p.recommend(Tier::Surrogate, &ActionType::ShellExec),
        Recommendation::Caution
    );
    assert_eq!(
        p.recommend(Tier::Partner, &ActionType::ShellExec),
        Recommendation::Caution
    );
}

#[test]
fn override_on_associate_write_beats_scratch_scope() {
    let p = policy_with_overrides(vec![AdvisoryOverride {
        tier: Tier::Associate,
        action: ActionType::Write,
        recommendation: Recommendation::Caution,
    }]);
    assert_eq!(
        p.recommend_for_target(Tier::Associate, &ActionType::Write, Some("scratch/a.txt")),
        Recommendation::Caution
    );
}

// ── check_permission / log_override ──────────────────────

#[test]
fn restriction_is_still_permitted() {
    let check = default_policy().check_permission(Tier::Stranger, &ActionType::Write, None);
    assert!(check.permitted);
    assert_eq!(check.recommendation, Recommendation::Restriction);
    assert!(check.reason.contains("stranger"));
}

#[test]
fn every_cell_is_permitted() {
    let p = default_policy();
    for tier in Tier::ALL {
        for action in [ActionType::Read, ActionType::Write, ActionType::ShellExec] {
            assert!(p.check_permission(tier, &action, None).permitted);
        }
    }
}

#[test]
fn log_override_feeds_tracker() {
    let p = default_policy();
    let record = p.log_override(
        Tier::Stranger,
        &ActionType::Write,
        Recommendation::Restriction,
        "user confirmed",
        Some("notes.md"),
    );
    assert_eq!(record.reason, "user confirmed");
    assert_eq!(record.target.as_deref(), Some("notes.md"));
    assert_eq!(p.tracker.count(Tier::Stranger, &ActionType::Write), 1);
}

// ── Serde ────────────────────────────────────────────────

#[test]
fn action_type_serde_roundtrip() {
    let json = serde_json::to_string(&ActionType::ShellExec).unwrap();
    assert_eq!(json, "\"shell_exec\"");
    let parsed: ActionType = serde_json::from_str("\"deploy\"").unwrap();
    assert_eq!(parsed, ActionType::Other("deploy".into()));
    let alias: ActionType = serde_json::from_str("\"shell\"").unwrap();
    assert_eq!(alias, ActionType::ShellExec);
}

#[test]
fn recommendation_parses_case_insensitively() {
    assert_eq!(
        "Restriction".parse::<Recommendation>().unwrap(),
        Recommendation::Restriction
    );
    assert_eq!(Recommendation::Caution.to_string(), "caution");
    assert!(Recommendation::Allow < Recommendation::Restriction);
}
