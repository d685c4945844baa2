//! Paraswap Arbitrage Monitor
//!
//! Main entry point. Polls the Paraswap /prices aggregator for the
//! configured Polygon pairs, detects cross-venue spreads that beat gas plus
//! the profit threshold, and dispatches initiateArbitrage transactions
//! through the ArbitrageBot contract. Runs until SIGINT; shutdown finishes
//! the current pair before exiting.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use anyhow::{Context, Result};
use clap::Parser;
use ethers::prelude::*;
use paraswap_arb_bot::arbitrage::TradeExecutor;
use paraswap_arb_bot::config::load_config;
use paraswap_arb_bot::metrics::{self, Metrics};
use paraswap_arb_bot::monitor::MonitorLoop;
use paraswap_arb_bot::notify::Notifier;
use paraswap_arb_bot::quotes::QuoteClient;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn, Level};

/// Paraswap cross-venue arbitrage monitor (Polygon)
#[derive(Parser)]
#[command(name = "paraswap-arb-bot")]
struct Args {
    /// Alternate .env file to load before the default one
    #[arg(long, env = "ENV_FILE")]
    env_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let args = Args::parse();
    if let Some(path) = &args.env_file {
        dotenv::from_path(path).with_context(|| format!("failed to load {}", path))?;
    }

    let config = load_config()?;
    info!("Configuration loaded (chain_id: {})", config.chain_id);
    info!("RPC URL: {}", &config.rpc_url[..40.min(config.rpc_url.len())]);
    info!("Contract: {:?}", config.contract_address);
    info!("Trading pairs: {}", config.pairs.len());
    info!("Min profit threshold: {:.2}%", config.min_profit_threshold);
    info!("Poll interval: {:?}", config.poll_interval);

    // Connect and verify the RPC endpoint
    let provider =
        Provider::<Http>::try_from(config.rpc_url.as_str()).context("invalid RPC URL")?;
    let provider = Arc::new(provider);
    let block = provider
        .get_block_number()
        .await
        .context("RPC connection check failed")?;
    info!("Connected! Current block: {}", block);

    let wallet: LocalWallet = config
        .private_key
        .parse::<LocalWallet>()
        .context("PRIVATE_KEY is not a valid signing key")?
        .with_chain_id(config.chain_id);
    info!("Wallet loaded: {:?}", wallet.address());

    // Metrics endpoint runs as its own task; it shares only atomic cells
    // with the monitor loop. Binding failures are fatal at startup.
    let metrics = Arc::new(Metrics::new()?);
    let metrics_server = metrics::server(Arc::clone(&metrics), config.prometheus_port)
        .context("failed to bind metrics endpoint")?;
    tokio::spawn(async move {
        if let Err(e) = metrics_server.await {
            error!("Metrics server exited: {}", e);
        }
    });

    let client = QuoteClient::new(
        config.quote_api_url.clone(),
        config.chain_id,
        Arc::clone(&metrics),
    );
    let notifier = Notifier::from_config(&config);

    let mut executor = TradeExecutor::new(Arc::clone(&provider), wallet, config.clone());
    if config.live_mode {
        executor.set_dry_run(false);
        warn!("LIVE TRADING MODE ENABLED - REAL MONEY AT RISK!");
    } else {
        info!("Trade executor initialized (DRY RUN mode)");
    }

    // Clean shutdown: stop after the current pair's processing completes
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received - finishing current pair then stopping");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                // The monitor keeps its pacing even with the sender gone;
                // only signal-driven shutdown is lost.
                error!("Failed to listen for shutdown signal: {}", e);
            }
        }
    });

    let monitor = MonitorLoop::new(client, executor, Arc::clone(&metrics), notifier, config);
    monitor.run(shutdown_rx).await;

    info!("Shutdown complete");
    Ok(())
}
