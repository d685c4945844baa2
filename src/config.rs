//! Configuration management
//! Load settings from the environment (.env supported), once at startup.
//! The resulting BotConfig is immutable for the process lifetime.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::types::TokenPair;
use anyhow::{anyhow, bail, Context, Result};
use ethers::types::{Address, U256};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_QUOTE_API_URL: &str = "https://api.paraswap.io/prices";

/// Polygon pairs monitored by default:
/// AAVE/USDC, WBTC/WETH, USDC/USDT, USDC/WETH, WETH/WMATIC, DAI/USDC
const DEFAULT_TRADING_PAIRS: &str = "\
    0xD6DF932A45C0f255f85145f286eA0b292B21C90B:0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174,\
    0x1BFD67037B42Cf73acF2047067bd4F2C47D9BfD6:0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619,\
    0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174:0xc2132D05D31c914a87C6611C10748AEb04B58e8F,\
    0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174:0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619,\
    0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619:0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270,\
    0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063:0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174";

/// WMATIC, the intermediary hop for routed BUY quotes
const DEFAULT_WRAPPED_NATIVE: &str = "0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270";

/// Token symbols for log and notification labels, keyed by address.
/// Address parsing normalizes case, so mixed-case input resolves here too.
static TOKEN_SYMBOLS: Lazy<HashMap<Address, &'static str>> = Lazy::new(|| {
    [
        ("0xc2132d05d31c914a87c6611c10748aeb04b58e8f", "USDT"),
        ("0x0d500b1d8e8ef31e21c99d1db9a6444d3adf1270", "WMATIC"),
        ("0x7ceb23fd6bc0add59e62ac25578270cff1b9f619", "WETH"),
        ("0x2791bca1f2de4661ed88a30c99a7a9449aa84174", "USDC"),
        ("0x1bfd67037b42cf73acf2047067bd4f2c47d9bfd6", "WBTC"),
        ("0xd6df932a45c0f255f85145f286ea0b292b21c90b", "AAVE"),
        ("0x8f3cf7ad23cd3cadbd9735aff958023239c6a063", "DAI"),
        ("0x831753dd7087cac61ab5644b308642cc1c33dc13", "QUICK"),
        ("0xbbba073c31bf03b8d0d9b09a2e8a65f810b4348e", "SUSHI"),
    ]
    .into_iter()
    .map(|(addr, symbol)| (addr.parse().expect("static token address"), symbol))
    .collect()
});

pub fn token_symbol(address: &Address) -> &'static str {
    TOKEN_SYMBOLS.get(address).copied().unwrap_or("Unknown")
}

pub fn pair_label(src: &Address, dest: &Address) -> String {
    format!("{}/{}", token_symbol(src), token_symbol(dest))
}

/// Bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    // Network
    pub rpc_url: String,
    pub chain_id: u64,

    // Wallet and contract
    pub contract_address: Address,
    pub private_key: String,

    // Trading parameters
    pub min_profit_threshold: f64,
    pub gas_price_multiplier: f64,
    pub gas_limit_headroom: f64,
    pub live_mode: bool,

    // Quote service
    pub quote_api_url: String,
    pub quote_amount: U256,
    pub wrapped_native: Address,

    // Pairs to monitor
    pub pairs: Vec<TokenPair>,

    // Timing
    pub poll_interval: Duration,
    pub receipt_timeout: Duration,

    // Observability
    pub prometheus_port: u16,
    pub slack_webhook_url: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

pub fn load_config() -> Result<BotConfig> {
    dotenv::dotenv().ok();

    let contract_address = std::env::var("CONTRACT_ADDRESS")
        .context("CONTRACT_ADDRESS not set")?
        .parse::<Address>()
        .context("CONTRACT_ADDRESS is not a valid address")?;
    let private_key = std::env::var("PRIVATE_KEY").context("PRIVATE_KEY not set")?;

    let pairs_raw =
        std::env::var("TRADING_PAIRS").unwrap_or_else(|_| DEFAULT_TRADING_PAIRS.to_string());
    let pairs = parse_pairs(&pairs_raw)?;
    if pairs.is_empty() {
        bail!("TRADING_PAIRS resolved to an empty pair list");
    }

    let gas_price_multiplier: f64 = env_parsed("GAS_PRICE_MULTIPLIER", 1.1)?;
    if gas_price_multiplier < 1.0 {
        bail!(
            "GAS_PRICE_MULTIPLIER must be >= 1.0, got {}",
            gas_price_multiplier
        );
    }

    let quote_amount = {
        let raw = std::env::var("QUOTE_AMOUNT").unwrap_or_else(|_| "100000000".to_string());
        U256::from_dec_str(raw.trim())
            .map_err(|e| anyhow!("QUOTE_AMOUNT is not a base-units integer: {}", e))?
    };

    Ok(BotConfig {
        rpc_url: std::env::var("RPC_URL").unwrap_or_else(|_| "https://polygon-rpc.com".to_string()),
        chain_id: env_parsed("CHAIN_ID", 137)?,

        contract_address,
        private_key,

        min_profit_threshold: env_parsed("MIN_PROFIT_THRESHOLD", 0.1)?,
        gas_price_multiplier,
        gas_limit_headroom: env_parsed("GAS_LIMIT_HEADROOM", 1.1)?,
        live_mode: env_parsed("LIVE_MODE", false)?,

        quote_api_url: std::env::var("QUOTE_API_URL")
            .unwrap_or_else(|_| DEFAULT_QUOTE_API_URL.to_string()),
        quote_amount,
        wrapped_native: std::env::var("WRAPPED_NATIVE")
            .unwrap_or_else(|_| DEFAULT_WRAPPED_NATIVE.to_string())
            .parse::<Address>()
            .context("WRAPPED_NATIVE is not a valid address")?,

        pairs,

        poll_interval: Duration::from_secs(env_parsed("POLL_INTERVAL_SECS", 3u64)?),
        receipt_timeout: Duration::from_secs(env_parsed("RECEIPT_TIMEOUT_SECS", 180u64)?),

        prometheus_port: env_parsed("PROMETHEUS_PORT", 9090u16)?,
        slack_webhook_url: std::env::var("SLACK_WEBHOOK_URL").ok(),
        telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN").ok(),
        telegram_chat_id: std::env::var("TELEGRAM_CHAT_ID").ok(),
    })
}

/// Parse `SRC:DEST` comma-separated address pairs
fn parse_pairs(raw: &str) -> Result<Vec<TokenPair>> {
    raw.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| {
            let entry = entry.trim();
            let (src, dest) = entry
                .split_once(':')
                .with_context(|| format!("invalid trading pair '{}': expected SRC:DEST", entry))?;
            let src: Address = src
                .trim()
                .parse()
                .map_err(|e| anyhow!("invalid source token '{}': {}", src.trim(), e))?;
            let dest: Address = dest
                .trim()
                .parse()
                .map_err(|e| anyhow!("invalid dest token '{}': {}", dest.trim(), e))?;
            Ok(TokenPair::new(src, dest, pair_label(&src, &dest)))
        })
        .collect()
}

fn env_parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("invalid {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pairs_parse() {
        let pairs = parse_pairs(DEFAULT_TRADING_PAIRS).unwrap();
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0].symbol, "AAVE/USDC");
        assert_eq!(pairs[1].symbol, "WBTC/WETH");
        assert_eq!(pairs[5].symbol, "DAI/USDC");
    }

    #[test]
    fn rejects_malformed_pair_entry() {
        assert!(parse_pairs("0xD6DF932A45C0f255f85145f286eA0b292B21C90B").is_err());
        assert!(parse_pairs("not-an-address:also-not").is_err());
    }

    #[test]
    fn symbol_lookup_is_case_insensitive_at_the_boundary() {
        // Mixed-case input normalizes during address parsing
        let mixed: Address = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"
            .parse()
            .unwrap();
        assert_eq!(token_symbol(&mixed), "USDC");

        let unknown: Address = "0x0000000000000000000000000000000000000001"
            .parse()
            .unwrap();
        assert_eq!(token_symbol(&unknown), "Unknown");
    }
}
