//! Opportunity Detector
//!
//! Pure decision functions: selection between the SELL and routed BUY quote
//! variants, spread and net-profit math, and the go/no-go threshold test.
//! No I/O happens here, so everything is table-tested.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::types::{ArbitrageOpportunity, QuoteResponse, RouteSegment};
use tracing::debug;

/// Pick which of the two per-pair quote variants to act on.
///
/// The routed BUY quote wins when it carries a price route; otherwise fall
/// back to the SELL quote. `None` when neither variant produced a usable
/// answer.
pub fn choose_quote(
    sell: Option<QuoteResponse>,
    buy: Option<QuoteResponse>,
) -> Option<QuoteResponse> {
    match buy {
        Some(quote) if quote.price_route.is_some() => Some(quote),
        _ => sell.filter(|quote| quote.price_route.is_some()),
    }
}

/// Decide whether a quote is worth acting on.
///
/// spread% = (destUSD - srcUSD) / srcUSD * 100, defined as 0 when srcUSD is
/// 0; net% = spread% - gasCostUSD. Actionable iff net% >= the threshold.
/// A quote without route data yields `None`: nothing to act on, not an error.
pub fn detect(quote: &QuoteResponse, min_profit_threshold: f64) -> Option<ArbitrageOpportunity> {
    let route = quote.price_route.as_ref()?;
    if route.best_route.is_empty() {
        return None;
    }

    let spread_percent = if route.src_usd == 0.0 {
        0.0
    } else {
        (route.dest_usd - route.src_usd) / route.src_usd * 100.0
    };
    let net_profit_percent = spread_percent - route.gas_cost_usd;

    if net_profit_percent < min_profit_threshold {
        debug!(
            "Not actionable: spread {:.4}% - gas ${:.2} = {:.4}% < {:.4}%",
            spread_percent, route.gas_cost_usd, net_profit_percent, min_profit_threshold
        );
        return None;
    }

    Some(ArbitrageOpportunity {
        token_in: route.src_token,
        token_out: route.dest_token,
        gas_cost_usd: route.gas_cost_usd,
        src_amount: route.src_amount,
        dest_amount: route.dest_amount,
        best_route: route.best_route.clone(),
        src_value_usd: route.src_usd,
        spread_percent,
        net_profit_percent,
    })
}

/// Extract (buy venue, sell venue) from the best route: the exchange used
/// at the first hop and at the last hop of the primary route segment.
/// `None` when the route is structurally malformed.
pub fn route_venues(route: &[RouteSegment]) -> Option<(String, String)> {
    let segment = route.first()?;
    let buy = segment.swaps.first()?.swap_exchanges.first()?;
    let sell = segment.swaps.last()?.swap_exchanges.first()?;
    Some((buy.exchange.clone(), sell.exchange.clone()))
}
