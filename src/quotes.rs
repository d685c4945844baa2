//! Paraswap Quote Client
//!
//! HTTP client for the aggregator /prices endpoint with rate-limit-aware
//! bounded retry. The aggregator enforces roughly 1 req/s, so the policy
//! must never retry aggressively: exponential backoff with jitter capped at
//! 60s, and a hard ceiling of 5 retries per logical request.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::metrics::Metrics;
use crate::types::{QuoteRequest, QuoteResponse};
use rand::Rng;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Maximum retries after the initial request (6 requests total)
pub const MAX_RETRIES: u32 = 5;

/// Backoff cap in seconds
const BACKOFF_CAP_SECS: f64 = 60.0;

const LATENCY_ENDPOINT: &str = "paraswap_prices";

/// How a single request attempt failed
enum FetchError {
    /// 429 from the aggregator, worth retrying after backoff
    RateLimited,
    /// Client error, transport error, or parse error; retrying won't help
    Fatal,
}

/// Client for the external price-quoting service
pub struct QuoteClient {
    http: reqwest::Client,
    api_url: String,
    network: u64,
    metrics: Arc<Metrics>,
    /// One "second" of backoff; shrunk by tests so retries do not sleep
    backoff_unit: Duration,
}

impl QuoteClient {
    pub fn new(api_url: impl Into<String>, network: u64, metrics: Arc<Metrics>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            network,
            metrics,
            backoff_unit: Duration::from_secs(1),
        }
    }

    /// Override the backoff time base (tests)
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Fetch one price quote.
    ///
    /// Returns `None` when no quote could be obtained for any reason; the
    /// caller treats that exactly like a non-actionable quote. Retries are
    /// an explicit bounded loop, never recursion.
    pub async fn fetch_quote(&self, request: &QuoteRequest) -> Option<QuoteResponse> {
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let wait = self.backoff_unit.mul_f64(backoff_secs(attempt));
                info!(
                    "Waiting {:.2}s before quote retry {}/{}",
                    wait.as_secs_f64(),
                    attempt,
                    MAX_RETRIES
                );
                tokio::time::sleep(wait).await;
            }

            match self.request_once(request).await {
                Ok(quote) => return Some(quote),
                Err(FetchError::RateLimited) => continue,
                Err(FetchError::Fatal) => return None,
            }
        }

        warn!(
            "Quote retries exhausted ({} requests) for {:?} -> {:?}",
            MAX_RETRIES + 1,
            request.src_token,
            request.dest_token
        );
        None
    }

    async fn request_once(&self, request: &QuoteRequest) -> Result<QuoteResponse, FetchError> {
        let started = Instant::now();

        // Debug-format addresses: full lower-case hex on the wire
        let mut params: Vec<(&str, String)> = vec![
            ("srcToken", format!("{:?}", request.src_token)),
            ("destToken", format!("{:?}", request.dest_token)),
            ("amount", request.amount.to_string()),
            ("network", self.network.to_string()),
            ("side", request.side.as_str().to_string()),
            (
                "otherExchangePrices",
                request.other_exchange_prices.to_string(),
            ),
        ];
        if let Some(route) = &request.route {
            let joined = route
                .iter()
                .map(|hop| format!("{:?}", hop))
                .collect::<Vec<_>>()
                .join("-");
            params.push(("route", joined));
        }

        let response = match self.http.get(&self.api_url).query(&params).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Quote request failed: {}", e);
                return Err(FetchError::Fatal);
            }
        };

        let status = response.status();
        if status.is_success() {
            // Latency covers the HTTP round trip for every successful
            // response, whether or not the body parses
            self.metrics
                .observe_api_latency(LATENCY_ENDPOINT, started.elapsed());
            return match response.json::<QuoteResponse>().await {
                Ok(quote) => Ok(quote),
                Err(e) => {
                    error!("Failed to parse quote response: {}", e);
                    Err(FetchError::Fatal)
                }
            };
        }

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = header_value(&response, "Retry-After");
                let reset = header_value(&response, "X-RateLimit-Reset");
                warn!(
                    "Rate limited by aggregator (429), retry_after={:?} reset={:?}",
                    retry_after, reset
                );
                Err(FetchError::RateLimited)
            }
            StatusCode::NOT_FOUND => {
                error!("Quote resource not found (404)");
                Err(FetchError::Fatal)
            }
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                error!("Invalid quote request (400): {}", body);
                Err(FetchError::Fatal)
            }
            other => {
                error!("Unexpected quote status: {}", other);
                Err(FetchError::Fatal)
            }
        }
    }
}

fn header_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Backoff before retry `attempt` (1-based): min(60, 2^attempt) seconds
/// plus up to one second of uniform jitter.
pub fn backoff_secs(attempt: u32) -> f64 {
    let base = 2.0_f64.powi(attempt as i32).min(BACKOFF_CAP_SECS);
    base + rand::thread_rng().gen_range(0.0..1.0)
}
