use crate::app::status::{render_entry, render_status};
use crate::cli::commands::{Cli, Commands};
use anyhow::{Context, Result};
use std::sync::Arc;
use trustward::Config;
use trustward::affect::{AffectModel, AffectStore};
use trustward::ledger::{ActionLedger, RollbackTarget, SafetyEngine};
use trustward::security::{ActionType, AdvisoryPolicy, Tier};
use trustward::tools::ToolRegistry;

fn load_affect(config: &Config) -> (Arc<AffectModel>, AffectStore) {
    let store = AffectStore::new(config.affect_state_path());
    let model = Arc::new(AffectModel::new(
        store.load_or_default(),
        config.affect.clone(),
    ));
    (model, store)
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Status => {
            let (affect, _) = load_affect(&config);
            let ledger = ActionLedger::open(config.ledger_path());
            println!(
                "{}",
                render_status(&config, &affect.snapshot(), &ledger.entries())
            );
            Ok(())
        }

        Commands::Ledger { limit } => {
            let ledger = ActionLedger::open(config.ledger_path());
            let entries = ledger.recent(limit);
            if entries.is_empty() {
                println!("Ledger is empty.");
            }
            for entry in entries {
                println!("{}", render_entry(&entry));
            }
            Ok(())
        }

        Commands::Rollback {
            id,
            by_snapshot,
            reason,
        } => {
            let engine = SafetyEngine::from_config(&config, ToolRegistry::new(&config.tools));
            let target = if by_snapshot {
                RollbackTarget::SnapshotId(id)
            } else {
                RollbackTarget::ActionId(id)
            };
            let result = engine
                .rollback_action(target, &reason)
                .await
                .context("rollback failed")?;
            println!(
                "Rolled back {} ({} -> {}), trust -{:.2} = {:.3} [{}]",
                result.action_id,
                result.original_snapshot,
                result.new_snapshot,
                result.trust_penalty,
                result.trust_after,
                result.status
            );
            Ok(())
        }

        Commands::Decay => {
            let (affect, store) = load_affect(&config);
            affect.decay();
            store.save(&affect.snapshot())?;
            let state = affect.snapshot();
            println!(
                "arousal {:.3}, warmth {:.3}, valence {:+.3}",
                state.arousal(),
                state.warmth(),
                state.valence()
            );
            Ok(())
        }

        Commands::Reunion => {
            let (affect, store) = load_affect(&config);
            let fired = affect.check_reunion();
            store.save(&affect.snapshot())?;
            if fired {
                println!("Welcome back. arousal {:.3}", affect.snapshot().arousal());
            } else {
                println!("No reunion; last interaction was recent.");
            }
            Ok(())
        }

        Commands::Recommend { tier, action } => {
            let tier: Tier = tier
                .trim()
                .parse()
                .with_context(|| format!("unknown tier: {tier}"))?;
            let action = ActionType::from(action.as_str());
            let policy = AdvisoryPolicy::from_config(&config.advisory, &config.workspace_dir);
            let check = policy.check_permission(tier, &action, None);
            println!("{}: {}", check.recommendation, check.reason);
            Ok(())
        }
    }
}
