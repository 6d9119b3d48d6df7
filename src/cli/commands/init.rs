use anyhow::{Context, Result};
use clap::Args;
use std::time::Duration;

use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat};
use crate::services::Services;
use crate::utils::RetryConfig;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Connection attempts per backend before giving up
    #[arg(long, default_value_t = 5)]
    pub attempts: u32,
}

pub async fn handle_init(args: InitArgs, format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);
    let retry = RetryConfig::new(args.attempts.max(1)).with_max_delay(Duration::from_secs(10));

    let services = Services::connect_with_retry(&config, &retry)
        .await
        .context("failed to connect to backends")?;

    let result = services.bootstrap(&retry).await;
    services.close().await;
    result.context("failed to initialise storage")?;

    println!(
        "{}",
        formatter.format_message(&format!(
            "Storage ready: tables created, vector collection '{}' ({} dimensions)",
            config.vector_store.collection, config.vector_store.dimension
        ))
    );

    Ok(())
}
