//! Arbitrage Module
//!
//! Quote selection, opportunity detection, and trade execution for
//! aggregator-quoted cross-venue spreads.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

pub mod detector;
pub mod executor;

pub use detector::{choose_quote, detect, route_venues};
pub use executor::{ExecutionError, TradeExecutor};
