//! Core data structures: monitored pairs, quote requests, the aggregator
//! wire format, and the opportunity/outcome types that flow between the
//! detector, the executor, and the observability sinks.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use ethers::types::{Address, TxHash, U256};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;

/// Token pair monitored for cross-venue spreads.
/// Loaded once from configuration, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub src_token: Address,
    pub dest_token: Address,
    pub symbol: String,
}

impl TokenPair {
    pub fn new(src_token: Address, dest_token: Address, symbol: String) -> Self {
        Self {
            src_token,
            dest_token,
            symbol,
        }
    }
}

/// Which side of the swap the aggregator should price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSide {
    Sell,
    Buy,
}

impl QuoteSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteSide::Sell => "SELL",
            QuoteSide::Buy => "BUY",
        }
    }
}

impl fmt::Display for QuoteSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One price request against the aggregator. Constructed fresh per call,
/// never mutated. `amount` is in the source token's base units.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub src_token: Address,
    pub dest_token: Address,
    pub amount: U256,
    pub side: QuoteSide,
    /// Optional fixed routing: ordered hop addresses, dash-joined on the wire
    pub route: Option<Vec<Address>>,
    pub other_exchange_prices: bool,
}

/// Top-level aggregator answer. `price_route` is absent on malformed or
/// empty responses; that is "nothing to act on", not an error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    #[serde(default)]
    pub price_route: Option<PriceRoute>,
    /// Per-venue rates, present when otherExchangePrices was requested
    #[serde(default)]
    pub others: Option<HashMap<String, VenuePrice>>,
}

/// A single venue's rate in the cross-venue comparison map
#[derive(Debug, Clone, Deserialize)]
pub struct VenuePrice {
    #[serde(default, deserialize_with = "f64_flexible")]
    pub rate: f64,
}

/// One point-in-time aggregator quote. Discarded after use, never persisted.
///
/// The USD fields arrive as decimal strings on the wire; amounts are
/// base-unit decimal-string integers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRoute {
    pub src_token: Address,
    pub dest_token: Address,
    #[serde(deserialize_with = "u256_from_dec")]
    pub src_amount: U256,
    #[serde(deserialize_with = "u256_from_dec")]
    pub dest_amount: U256,
    #[serde(rename = "srcUSD", deserialize_with = "f64_flexible")]
    pub src_usd: f64,
    #[serde(rename = "destUSD", deserialize_with = "f64_flexible")]
    pub dest_usd: f64,
    #[serde(rename = "gasCostUSD", default, deserialize_with = "f64_flexible")]
    pub gas_cost_usd: f64,
    #[serde(default)]
    pub best_route: Vec<RouteSegment>,
}

/// One leg of the aggregator's best route
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteSegment {
    #[serde(default)]
    pub swaps: Vec<Hop>,
}

/// One swap step, potentially split across several venues
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hop {
    #[serde(default)]
    pub swap_exchanges: Vec<VenueSplit>,
}

/// Share of a hop routed through one venue
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueSplit {
    pub exchange: String,
    #[serde(default, deserialize_with = "f64_flexible")]
    pub percent: f64,
}

/// Actionable spread derived from a quote. Exists only transiently between
/// detection and execution dispatch within one loop pass.
#[derive(Debug, Clone)]
pub struct ArbitrageOpportunity {
    pub token_in: Address,
    pub token_out: Address,
    pub gas_cost_usd: f64,
    pub src_amount: U256,
    pub dest_amount: U256,
    pub best_route: Vec<RouteSegment>,
    /// USD value of the input leg, kept for profit-in-USD reporting
    pub src_value_usd: f64,
    pub spread_percent: f64,
    pub net_profit_percent: f64,
}

/// Final disposition of a dispatched arbitrage trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    /// Mined with success status
    Confirmed,
    /// Dry-run pass: nothing was submitted. Kept distinct from Confirmed so
    /// trade metrics and alerts never report simulated trades as executed.
    Simulated,
    /// Mined but the contract rejected the trade (receipt status 0)
    Reverted,
    /// Receipt wait timed out. The transaction's fate is unknown and must
    /// be reconciled by an operator, never guessed.
    Unconfirmed,
}

/// Produced once per executed trade, forwarded to observability, discarded
#[derive(Debug, Clone)]
pub struct TradeOutcome {
    pub tx_hash: TxHash,
    pub status: TradeStatus,
    pub gas_used: U256,
    pub profit_usd: f64,
}

impl TradeOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == TradeStatus::Confirmed
    }
}

/// Aggregator USD fields are sometimes numbers, sometimes decimal strings
fn f64_flexible<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
    }

    match NumOrStr::deserialize(deserializer)? {
        NumOrStr::Num(n) => Ok(n),
        NumOrStr::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Base-unit amounts arrive as decimal strings, not hex
fn u256_from_dec<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    U256::from_dec_str(raw.trim()).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Shape taken from a live /prices response, trimmed to the fields we read
    const QUOTE_JSON: &str = r#"{
        "priceRoute": {
            "srcToken": "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174",
            "destToken": "0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619",
            "srcAmount": "1000000000",
            "destAmount": "500000000000000000",
            "srcUSD": "1000.0",
            "destUSD": "1002.0",
            "gasCostUSD": "5.0",
            "bestRoute": [{
                "swaps": [
                    {"swapExchanges": [{"exchange": "QuickSwap", "percent": 100}]},
                    {"swapExchanges": [{"exchange": "SushiSwap", "percent": 100}]}
                ]
            }]
        },
        "others": {
            "QuickSwap": {"rate": "0.000499"},
            "SushiSwap": {"rate": 0.000501}
        }
    }"#;

    #[test]
    fn parses_aggregator_response() {
        let quote: QuoteResponse = serde_json::from_str(QUOTE_JSON).unwrap();
        let route = quote.price_route.as_ref().unwrap();

        let usdc: Address = "0x2791bca1f2de4661ed88a30c99a7a9449aa84174"
            .parse()
            .unwrap();
        assert_eq!(route.src_token, usdc);
        assert_eq!(route.src_amount, U256::from(1_000_000_000u64));
        assert_eq!(route.dest_amount, U256::from(500_000_000_000_000_000u64));
        assert!((route.src_usd - 1000.0).abs() < 1e-9);
        assert!((route.dest_usd - 1002.0).abs() < 1e-9);
        assert!((route.gas_cost_usd - 5.0).abs() < 1e-9);

        let segment = &route.best_route[0];
        assert_eq!(segment.swaps.len(), 2);
        assert_eq!(segment.swaps[0].swap_exchanges[0].exchange, "QuickSwap");
        assert_eq!(segment.swaps[1].swap_exchanges[0].exchange, "SushiSwap");

        let others = quote.others.as_ref().unwrap();
        assert!((others["QuickSwap"].rate - 0.000499).abs() < 1e-9);
        assert!((others["SushiSwap"].rate - 0.000501).abs() < 1e-9);
    }

    #[test]
    fn mixed_case_addresses_compare_equal() {
        let lower: Address = "0x2791bca1f2de4661ed88a30c99a7a9449aa84174"
            .parse()
            .unwrap();
        let mixed: Address = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"
            .parse()
            .unwrap();
        assert_eq!(lower, mixed);
    }

    #[test]
    fn missing_price_route_is_not_an_error() {
        let quote: QuoteResponse = serde_json::from_str(r#"{"error": "computePrice"}"#).unwrap();
        assert!(quote.price_route.is_none());
    }

    #[test]
    fn usd_fields_accept_plain_numbers() {
        let json = r#"{
            "priceRoute": {
                "srcToken": "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174",
                "destToken": "0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619",
                "srcAmount": "1",
                "destAmount": "2",
                "srcUSD": 10.5,
                "destUSD": 10.6,
                "gasCostUSD": 0.05,
                "bestRoute": []
            }
        }"#;
        let quote: QuoteResponse = serde_json::from_str(json).unwrap();
        let route = quote.price_route.unwrap();
        assert!((route.src_usd - 10.5).abs() < 1e-9);
        assert!(route.best_route.is_empty());
    }
}
