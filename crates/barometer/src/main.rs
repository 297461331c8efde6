use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::info;

use barometer::{
    config::{open_config, write_default_config},
    server::{self, AppState},
    storage::open_database,
};

#[derive(Parser)]
#[command(version)]
struct Args {
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    if args.init {
        write_default_config(&args.config)?;
        info!(path = ?args.config, "Created default configuration");
        return Ok(());
    }

    info!(version = env!("CARGO_PKG_VERSION"), "barometer version");

    let config = open_config(&args.config).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let db = open_database(&config.storage)
        .await
        .context("Failed to open storage")?;
    info!(area = %config.slack.area, "Configuration loaded");

    let state = AppState {
        slack: Arc::new(config.slack),
        db,
    };
    server::serve(config.server.listen, state).await
}
