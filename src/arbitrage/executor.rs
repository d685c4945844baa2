//! Trade Executor
//!
//! Builds, signs, submits, and confirms the initiateArbitrage transaction
//! for a detected opportunity. Strictly sequential with no automatic
//! retries: resubmitting risks nonce collisions and double execution, so
//! retry policy for failed trades belongs to an operator, not this process.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::config::BotConfig;
use crate::contracts::{ArbitrageBot, ArbitrageResultFilter};
use crate::types::{ArbitrageOpportunity, TradeOutcome, TradeStatus};
use ethers::contract::parse_log;
use ethers::prelude::*;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};

/// Failure while preparing or submitting the transaction. The trade never
/// reached a mined receipt; an on-chain revert is reported as an
/// unsuccessful TradeOutcome instead, never as this error.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("gas estimation failed: {0}")]
    GasEstimation(String),
    #[error("gas price query failed: {0}")]
    GasPrice(String),
    #[error("nonce query failed: {0}")]
    Nonce(String),
    #[error("signing failed: {0}")]
    Sign(String),
    #[error("submission failed: {0}")]
    Submit(String),
    #[error("receipt wait failed: {0}")]
    Confirmation(String),
}

/// Trade executor for aggregator-detected opportunities
pub struct TradeExecutor<M: Middleware> {
    provider: Arc<M>,
    wallet: LocalWallet,
    contract: ArbitrageBot<M>,
    config: BotConfig,
    /// Dry run mode - logs the trade without touching the chain
    dry_run: bool,
}

impl<M: Middleware + 'static> TradeExecutor<M> {
    pub fn new(provider: Arc<M>, wallet: LocalWallet, config: BotConfig) -> Self {
        let contract = ArbitrageBot::new(config.contract_address, Arc::clone(&provider));
        Self {
            provider,
            wallet,
            contract,
            config,
            dry_run: true, // Default to dry run for safety
        }
    }

    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
        if dry_run {
            info!("Executor in DRY RUN mode - trades will be simulated");
        } else {
            warn!("Executor in LIVE mode - trades will be executed!");
        }
    }

    /// Execute one arbitrage opportunity.
    ///
    /// Sequence: estimate gas, price gas, build with a fresh nonce, sign and
    /// submit raw, then wait (bounded) for the receipt. A failure in any
    /// preparation step aborts with nothing at risk on-chain.
    pub async fn execute(
        &self,
        opportunity: &ArbitrageOpportunity,
        buy_venue: &str,
        sell_venue: &str,
        amount: U256,
    ) -> Result<TradeOutcome, ExecutionError> {
        let estimated_profit_usd =
            opportunity.src_value_usd * opportunity.net_profit_percent / 100.0;

        info!(
            "Executing arbitrage: {:?} -> {:?} | buy on {} | sell on {} | amount {} | est. ${:.2}",
            opportunity.token_in,
            opportunity.token_out,
            buy_venue,
            sell_venue,
            amount,
            estimated_profit_usd
        );

        if self.dry_run {
            info!(
                "DRY RUN: would call initiateArbitrage (spread {:.4}%, net {:.4}%)",
                opportunity.spread_percent, opportunity.net_profit_percent
            );
            return Ok(TradeOutcome {
                tx_hash: TxHash::zero(),
                status: TradeStatus::Simulated,
                gas_used: U256::zero(),
                profit_usd: 0.0,
            });
        }

        let call = self
            .contract
            .initiate_arbitrage(
                opportunity.token_in,
                opportunity.token_out,
                amount,
                buy_venue.to_string(),
                sell_venue.to_string(),
            )
            .from(self.wallet.address());

        // Step 1: estimate. Failure aborts before anything is sent.
        let gas_estimate = call
            .estimate_gas()
            .await
            .map_err(|e| ExecutionError::GasEstimation(e.to_string()))?;

        // Step 2: current gas price scaled for inclusion probability
        let gas_price = self
            .provider
            .get_gas_price()
            .await
            .map_err(|e| ExecutionError::GasPrice(e.to_string()))?;
        let gas_price = scale_u256(gas_price, self.config.gas_price_multiplier);

        // Step 3: build with headroom and a nonce read fresh for this build
        let nonce = self
            .provider
            .get_transaction_count(self.wallet.address(), None)
            .await
            .map_err(|e| ExecutionError::Nonce(e.to_string()))?;
        let gas_limit = scale_u256(gas_estimate, self.config.gas_limit_headroom);

        let mut tx = call.tx.clone();
        tx.set_gas(gas_limit);
        tx.set_gas_price(gas_price);
        tx.set_nonce(nonce);
        tx.set_chain_id(self.config.chain_id);

        // Step 4: sign locally, submit raw
        let signature = self
            .wallet
            .sign_transaction(&tx)
            .await
            .map_err(|e| ExecutionError::Sign(e.to_string()))?;
        let pending = self
            .provider
            .send_raw_transaction(tx.rlp_signed(&signature))
            .await
            .map_err(|e| ExecutionError::Submit(e.to_string()))?;
        let tx_hash = pending.tx_hash();

        info!(
            "Arbitrage tx submitted: {:?} | gas limit {} | gas price {} wei | nonce {}",
            tx_hash, gas_limit, gas_price, nonce
        );

        // Step 5: bounded confirmation wait. An unconfirmed transaction must
        // not hang the loop; its fate is reported as unknown instead.
        let receipt = match timeout(self.config.receipt_timeout, pending).await {
            Ok(Ok(Some(receipt))) => receipt,
            Ok(Ok(None)) => {
                warn!("No receipt returned for {:?} - outcome unknown", tx_hash);
                return Ok(unconfirmed_outcome(tx_hash));
            }
            Ok(Err(e)) => return Err(ExecutionError::Confirmation(e.to_string())),
            Err(_) => {
                warn!(
                    "Receipt wait timed out after {:?} for {:?} - outcome unknown, reconcile manually",
                    self.config.receipt_timeout, tx_hash
                );
                return Ok(unconfirmed_outcome(tx_hash));
            }
        };

        Ok(outcome_from_receipt(&receipt, estimated_profit_usd))
    }
}

/// Classify a mined receipt. A revert is a reported outcome, not an error:
/// the attempt reached the chain and the contract logic rejected it.
pub fn outcome_from_receipt(
    receipt: &TransactionReceipt,
    estimated_profit_usd: f64,
) -> TradeOutcome {
    let gas_used = receipt.gas_used.unwrap_or_default();
    let tx_hash = receipt.transaction_hash;

    if receipt.status != Some(U64::one()) {
        return TradeOutcome {
            tx_hash,
            status: TradeStatus::Reverted,
            gas_used,
            profit_usd: 0.0,
        };
    }

    if let Some(event) = receipt
        .logs
        .iter()
        .find_map(|log| parse_log::<ArbitrageResultFilter>(log.clone()).ok())
    {
        info!(
            "ArbitrageResult event: success={} profit={} gasUsed={} message='{}'",
            event.success, event.profit, event.gas_used, event.message
        );
    }

    TradeOutcome {
        tx_hash,
        status: TradeStatus::Confirmed,
        gas_used,
        profit_usd: estimated_profit_usd,
    }
}

fn unconfirmed_outcome(tx_hash: TxHash) -> TradeOutcome {
    TradeOutcome {
        tx_hash,
        status: TradeStatus::Unconfirmed,
        gas_used: U256::zero(),
        profit_usd: 0.0,
    }
}

/// Scale a U256 by a small positive factor (e.g. 1.1) in basis points to
/// stay in integer math
fn scale_u256(value: U256, factor: f64) -> U256 {
    let bps = (factor * 10_000.0).round() as u64;
    value * U256::from(bps) / U256::from(10_000u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RouteSegment;
    use std::time::Duration;

    fn test_config() -> BotConfig {
        BotConfig {
            rpc_url: String::new(),
            chain_id: 137,
            contract_address: Address::repeat_byte(0x42),
            private_key: String::new(),
            min_profit_threshold: 0.1,
            gas_price_multiplier: 1.1,
            gas_limit_headroom: 1.1,
            live_mode: false,
            quote_api_url: String::new(),
            quote_amount: U256::from(100_000_000u64),
            wrapped_native: Address::zero(),
            pairs: vec![],
            poll_interval: Duration::from_secs(3),
            receipt_timeout: Duration::from_secs(180),
            prometheus_port: 9090,
            slack_webhook_url: None,
            telegram_bot_token: None,
            telegram_chat_id: None,
        }
    }

    fn test_opportunity() -> ArbitrageOpportunity {
        ArbitrageOpportunity {
            token_in: Address::repeat_byte(0xaa),
            token_out: Address::repeat_byte(0xbb),
            gas_cost_usd: 0.05,
            src_amount: U256::from(1_000_000_000u64),
            dest_amount: U256::from(500_000_000_000_000_000u64),
            best_route: vec![RouteSegment::default()],
            src_value_usd: 1000.0,
            spread_percent: 0.2,
            net_profit_percent: 0.15,
        }
    }

    #[tokio::test]
    async fn estimation_failure_submits_nothing() {
        // MockProvider with no queued responses: the very first RPC call
        // (eth_estimateGas) errors, so no transaction can ever be submitted.
        let (provider, _mock) = Provider::mocked();
        let provider = Arc::new(provider);
        let wallet = LocalWallet::new(&mut rand::thread_rng()).with_chain_id(137u64);

        let mut executor = TradeExecutor::new(provider, wallet, test_config());
        executor.set_dry_run(false);

        let result = executor
            .execute(
                &test_opportunity(),
                "QuickSwap",
                "SushiSwap",
                U256::from(1_000_000_000u64),
            )
            .await;

        assert!(matches!(result, Err(ExecutionError::GasEstimation(_))));
    }

    #[tokio::test]
    async fn dry_run_touches_no_rpc() {
        let (provider, _mock) = Provider::mocked();
        let provider = Arc::new(provider);
        let wallet = LocalWallet::new(&mut rand::thread_rng()).with_chain_id(137u64);

        // Default executor stays in dry-run; an empty mock would error on
        // any RPC call, so success proves nothing was sent.
        let executor = TradeExecutor::new(provider, wallet, test_config());
        let outcome = executor
            .execute(
                &test_opportunity(),
                "QuickSwap",
                "SushiSwap",
                U256::from(1_000_000_000u64),
            )
            .await
            .unwrap();
        // Simulated, not Confirmed: dry runs must never count as executed
        assert_eq!(outcome.status, TradeStatus::Simulated);
        assert!(!outcome.succeeded());
        assert_eq!(outcome.tx_hash, TxHash::zero());
    }

    #[test]
    fn reverted_receipt_is_an_unsuccessful_outcome() {
        let receipt = TransactionReceipt {
            transaction_hash: TxHash::repeat_byte(0x11),
            status: Some(U64::zero()),
            gas_used: Some(U256::from(21_000u64)),
            ..Default::default()
        };

        let outcome = outcome_from_receipt(&receipt, 5.0);
        assert_eq!(outcome.status, TradeStatus::Reverted);
        assert!(!outcome.succeeded());
        assert_eq!(outcome.gas_used, U256::from(21_000u64));
        // No profit is reported for a reverted trade
        assert_eq!(outcome.profit_usd, 0.0);
    }

    #[test]
    fn confirmed_receipt_reports_profit() {
        let receipt = TransactionReceipt {
            transaction_hash: TxHash::repeat_byte(0x22),
            status: Some(U64::one()),
            gas_used: Some(U256::from(180_000u64)),
            ..Default::default()
        };

        let outcome = outcome_from_receipt(&receipt, 1.5);
        assert_eq!(outcome.status, TradeStatus::Confirmed);
        assert!(outcome.succeeded());
        assert!((outcome.profit_usd - 1.5).abs() < 1e-9);
    }

    #[test]
    fn unconfirmed_outcome_is_neither_success_nor_revert() {
        let outcome = unconfirmed_outcome(TxHash::repeat_byte(0x33));
        assert_eq!(outcome.status, TradeStatus::Unconfirmed);
        assert!(!outcome.succeeded());
    }

    #[test]
    fn scaling_applies_headroom_in_integer_math() {
        assert_eq!(
            scale_u256(U256::from(100_000u64), 1.1),
            U256::from(110_000u64)
        );
        assert_eq!(scale_u256(U256::from(200u64), 1.0), U256::from(200u64));
        assert_eq!(
            scale_u256(U256::from(30_000_000_000u64), 1.25),
            U256::from(37_500_000_000u64)
        );
    }
}
