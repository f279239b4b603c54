use clap::{Parser, Subcommand};

/// `trustward` - trust-governed action safety engine.
#[derive(Parser, Debug)]
#[command(name = "trustward")]
#[command(version)]
#[command(about = "Inspect and operate the trust ledger.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.trustward/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show affect state, tier and posture
    Status,

    /// List recent ledger entries, newest first
    Ledger {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Revert a logged action to its snapshot
    Rollback {
        /// Action id (or snapshot id with --by-snapshot)
        id: String,

        /// Treat the id as a snapshot id
        #[arg(long)]
        by_snapshot: bool,

        /// Why the action is being rolled back
        #[arg(long)]
        reason: String,
    },

    /// Apply one decay tick and persist the result
    Decay,

    /// Check for a reunion after a long absence
    Reunion,

    /// Show the advisory recommendation for a tier and action
    Recommend {
        /// stranger, associate, partner or surrogate
        tier: String,

        /// read, write, shell_exec, network, or any tool action name
        action: String,
    },
}
