#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names
)]

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod app;
mod cli;

use cli::commands::Cli;
use trustward::Config;

fn log_level() -> Level {
    std::env::var("TRUSTWARD_LOG")
        .ok()
        .and_then(|raw| raw.trim().parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(std::path::Path::new(path))?,
        None => Config::load_or_init()?,
    };
    app::dispatch::dispatch(cli, config).await
}
