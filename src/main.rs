// src/main.rs

//! chollobot: Amazon deal discovery and Telegram broadcast agent.
//!
//! Runs two independent cadences against one shared channel: a recurring
//! discovery cycle (search, dedupe, publish) and a once-daily promotional
//! broadcast at a fixed local time.

mod config;
mod error;
mod models;
mod pipeline;
mod services;
mod utils;

use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::Credentials;
use crate::error::Result;
use crate::models::{Config, Promotion, StrategyCatalog};
use crate::pipeline::{CycleSettings, DailyBroadcaster, DiscoveryCycle};
use crate::services::{PaapiClient, TelegramBot};

#[derive(Parser, Debug)]
#[command(
    name = "chollobot",
    version,
    about = "Discovers Amazon deals and broadcasts them to a Telegram channel"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the discovery loop and the daily broadcaster (default)
    Run,

    /// Execute a single discovery cycle and exit
    Cycle,

    /// Publish the daily promotions immediately and exit
    Broadcast,

    /// Validate configuration and credentials
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("chollobot starting...");

    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    // Fail fast: no loop starts without a full set of credentials.
    let credentials = Credentials::from_env()?;

    let publisher = TelegramBot::new(
        &credentials.telegram_bot_token,
        &credentials.telegram_chat_id,
        config.search.timeout_secs,
    )?;
    let source = PaapiClient::new(&credentials, &config.search)?;
    let catalog = StrategyCatalog::new(config.pools.clone())?;
    let settings = CycleSettings::from_config(&config);

    let promotions: Vec<Promotion> = config
        .promotions
        .iter()
        .cloned()
        .map(|p| p.with_tag(&credentials.amazon_associate_tag))
        .collect();
    let broadcaster = DailyBroadcaster::new(
        publisher.clone(),
        promotions,
        config.broadcast_time()?,
        Duration::from_secs(config.timing.broadcast_delay_secs),
        Duration::from_secs(config.timing.poll_interval_secs),
    );

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let mut cycle = DiscoveryCycle::new(source, publisher, catalog, settings);
            let broadcast_task = tokio::spawn(async move { broadcaster.run().await });

            tokio::select! {
                _ = cycle.run() => {}
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Shutdown requested. Stopping.");
                }
            }
            broadcast_task.abort();
        }

        Command::Cycle => {
            let mut cycle = DiscoveryCycle::new(source, publisher, catalog, settings);
            let stats = cycle.run_once().await;
            log::info!(
                "Cycle done: {} published, {} already seen, {} incomplete, {} failed",
                stats.published,
                stats.skipped_seen,
                stats.skipped_incomplete,
                stats.publish_failures
            );
        }

        Command::Broadcast => {
            let stats = broadcaster.broadcast_once().await;
            log::info!("Broadcast done: {} sent, {} failed", stats.sent, stats.failed);
        }

        Command::Validate => {
            // Config and credentials were already checked above.
            log::info!(
                "✓ Config OK ({} pools, {} promotions, marketplace {})",
                config.pools.len(),
                config.promotions.len(),
                credentials.amazon_country
            );
            log::info!("All validations passed!");
        }
    }

    Ok(())
}
