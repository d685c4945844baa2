//! Monitor Loop
//!
//! Orchestrates the per-pair pipeline: dual quote fetch (plain SELL with
//! cross-venue prices, BUY routed through the wrapped native token), quote
//! selection, detection, execution dispatch, and observability. One pair's
//! failure never aborts the loop or skips the pairs after it.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::arbitrage::{choose_quote, detect, route_venues, TradeExecutor};
use crate::config::BotConfig;
use crate::metrics::Metrics;
use crate::notify::Notifier;
use crate::quotes::QuoteClient;
use crate::types::{QuoteRequest, QuoteSide, TokenPair, TradeStatus};
use ethers::providers::Middleware;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

pub struct MonitorLoop<M: Middleware> {
    client: QuoteClient,
    executor: TradeExecutor<M>,
    metrics: Arc<Metrics>,
    notifier: Notifier,
    config: BotConfig,
}

impl<M: Middleware + 'static> MonitorLoop<M> {
    pub fn new(
        client: QuoteClient,
        executor: TradeExecutor<M>,
        metrics: Arc<Metrics>,
        notifier: Notifier,
        config: BotConfig,
    ) -> Self {
        Self {
            client,
            executor,
            metrics,
            notifier,
            config,
        }
    }

    /// Run until the shutdown signal fires. The current pair's processing
    /// always completes first, so a submission is never abandoned mid-flight.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Starting monitoring: {} pairs | min profit {:.2}% | poll interval {:?}",
            self.config.pairs.len(),
            self.config.min_profit_threshold,
            self.config.poll_interval
        );

        'monitor: loop {
            for pair in &self.config.pairs {
                if *shutdown.borrow() {
                    break 'monitor;
                }

                if let Err(e) = self.process_pair(pair).await {
                    error!("Error processing {}: {:#}", pair.symbol, e);
                }

                // Pace the aggregator across the whole pair list, not just
                // within one pair. The sleep must complete on every path
                // that does not shut down: a closed or spurious channel
                // wakeup that skipped it would let the loop hammer the
                // aggregator with unpaced requests.
                tokio::select! {
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                    changed = shutdown.changed() => {
                        if changed.is_ok() && *shutdown.borrow() {
                            break 'monitor;
                        }
                        // Sender dropped (no signal can ever arrive) or the
                        // value is still false: finish the pacing sleep.
                        tokio::time::sleep(self.config.poll_interval).await;
                    }
                }
            }
        }

        info!("Monitor loop stopped");
    }

    async fn process_pair(&self, pair: &TokenPair) -> anyhow::Result<()> {
        // SELL quote with cross-venue price disclosure
        let sell = self
            .client
            .fetch_quote(&QuoteRequest {
                src_token: pair.src_token,
                dest_token: pair.dest_token,
                amount: self.config.quote_amount,
                side: QuoteSide::Sell,
                route: None,
                other_exchange_prices: true,
            })
            .await;

        // BUY quote routed through the wrapped native token
        let buy = self
            .client
            .fetch_quote(&QuoteRequest {
                src_token: pair.src_token,
                dest_token: pair.dest_token,
                amount: self.config.quote_amount,
                side: QuoteSide::Buy,
                route: Some(vec![
                    pair.src_token,
                    self.config.wrapped_native,
                    pair.dest_token,
                ]),
                other_exchange_prices: true,
            })
            .await;

        let Some(quote) = choose_quote(sell, buy) else {
            return Ok(());
        };

        let Some(opportunity) = detect(&quote, self.config.min_profit_threshold) else {
            return Ok(());
        };

        self.metrics.record_opportunity();
        info!(
            "Opportunity: {} | spread {:.4}% | gas ${:.2} | net {:.4}%",
            pair.symbol,
            opportunity.spread_percent,
            opportunity.gas_cost_usd,
            opportunity.net_profit_percent
        );

        let Some((buy_venue, sell_venue)) = route_venues(&opportunity.best_route) else {
            warn!(
                "Opportunity for {} has no usable route venues - skipping",
                pair.symbol
            );
            return Ok(());
        };

        match self
            .executor
            .execute(&opportunity, &buy_venue, &sell_venue, opportunity.src_amount)
            .await
        {
            Ok(outcome) => match outcome.status {
                TradeStatus::Confirmed => {
                    self.metrics.record_trade(outcome.profit_usd);
                    info!(
                        "Trade confirmed: {:?} | gas used {} | profit ${:.2}",
                        outcome.tx_hash, outcome.gas_used, outcome.profit_usd
                    );
                    self.notifier
                        .notify(&format!(
                            "Arbitrage executed!\nPair: {}\nProfit: {:.2}%\nGas used: {}",
                            pair.symbol, opportunity.net_profit_percent, outcome.gas_used
                        ))
                        .await;
                }
                TradeStatus::Simulated => {
                    // Not an executed trade; keep metrics and alerts truthful
                    info!(
                        "DRY RUN trade for {} | net {:.4}% (not counted)",
                        pair.symbol, opportunity.net_profit_percent
                    );
                }
                TradeStatus::Reverted => {
                    warn!(
                        "Trade reverted on-chain: {:?} (pair {})",
                        outcome.tx_hash, pair.symbol
                    );
                }
                TradeStatus::Unconfirmed => {
                    warn!(
                        "Trade outcome unknown for {:?} (pair {}) - reconcile manually",
                        outcome.tx_hash, pair.symbol
                    );
                }
            },
            Err(e) => {
                // Preparation or submission failed for this pair's pass; the
                // loop carries on with the next pair
                error!("Execution failed for {}: {}", pair.symbol, e);
            }
        }

        Ok(())
    }
}
