//! Paraswap Arbitrage Monitor Library
//!
//! Provides components for cross-venue arbitrage monitoring on Polygon:
//! quote acquisition from the Paraswap price aggregator, profitability
//! detection, and on-chain execution through the ArbitrageBot contract.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

pub mod arbitrage;
pub mod config;
pub mod contracts;
pub mod metrics;
pub mod monitor;
pub mod notify;
pub mod quotes;
pub mod types;

// Re-export commonly used types
pub use arbitrage::{ExecutionError, TradeExecutor};
pub use config::{load_config, BotConfig};
pub use monitor::MonitorLoop;
pub use quotes::QuoteClient;
pub use types::{
    ArbitrageOpportunity, QuoteRequest, QuoteResponse, TokenPair, TradeOutcome, TradeStatus,
};
