//! Prometheus metrics and the /metrics endpoint
//!
//! The observability port shared by the monitor loop and the quote client.
//! All cells are atomic, so the scrape server and the loop never contend on
//! anything but the metric values themselves.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use anyhow::Result;
use hyper::server::conn::AddrIncoming;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use prometheus::{
    Encoder, Gauge, HistogramOpts, HistogramVec, IntCounter, Opts, Registry, TextEncoder,
};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Counters and gauges exported by the bot
pub struct Metrics {
    registry: Registry,
    opportunities_total: IntCounter,
    trades_total: IntCounter,
    profit_usd_total: Gauge,
    api_latency_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let opportunities_total = IntCounter::with_opts(Opts::new(
            "arb_opportunities_total",
            "Total arbitrage opportunities detected",
        ))?;
        let trades_total = IntCounter::with_opts(Opts::new(
            "arb_trades_total",
            "Total arbitrage trades executed",
        ))?;
        let profit_usd_total = Gauge::with_opts(Opts::new(
            "arb_profit_usd_total",
            "Cumulative realized profit in USD",
        ))?;
        let api_latency_seconds = HistogramVec::new(
            HistogramOpts::new("api_latency_seconds", "Quote API request latency"),
            &["endpoint"],
        )?;

        registry.register(Box::new(opportunities_total.clone()))?;
        registry.register(Box::new(trades_total.clone()))?;
        registry.register(Box::new(profit_usd_total.clone()))?;
        registry.register(Box::new(api_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            opportunities_total,
            trades_total,
            profit_usd_total,
            api_latency_seconds,
        })
    }

    pub fn record_opportunity(&self) {
        self.opportunities_total.inc();
    }

    pub fn record_trade(&self, profit_usd: f64) {
        self.trades_total.inc();
        self.profit_usd_total.add(profit_usd);
    }

    pub fn observe_api_latency(&self, endpoint: &str, elapsed: Duration) {
        self.api_latency_seconds
            .with_label_values(&[endpoint])
            .observe(elapsed.as_secs_f64());
    }

    /// Render the registry in the Prometheus text exposition format
    pub fn render(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}

/// Bind the scrape endpoint and return the serving future. Binding happens
/// here so a bad port fails at startup instead of inside a detached task.
pub fn server(
    metrics: Arc<Metrics>,
    port: u16,
) -> Result<impl Future<Output = hyper::Result<()>>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let make_svc = make_service_fn(move |_conn| {
        let metrics = Arc::clone(&metrics);
        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                let metrics = Arc::clone(&metrics);
                async move { Ok::<_, Infallible>(handle(req, &metrics)) }
            }))
        }
    });

    let incoming = AddrIncoming::bind(&addr)?;
    info!("Metrics server listening on {}", addr);
    Ok(Server::builder(incoming).serve(make_svc))
}

fn handle(req: Request<Body>, metrics: &Metrics) -> Response<Body> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => match metrics.render() {
            Ok(body) => Response::builder()
                .status(StatusCode::OK)
                .header("content-type", "text/plain; version=0.0.4")
                .body(Body::from(body))
                .unwrap(),
            Err(_) => Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::empty())
                .unwrap(),
        },
        _ => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::empty())
            .unwrap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_renders_metrics() {
        let metrics = Metrics::new().unwrap();
        metrics.record_opportunity();
        metrics.record_trade(12.5);
        metrics.record_trade(2.5);
        metrics.observe_api_latency("paraswap_prices", Duration::from_millis(250));

        let rendered = String::from_utf8(metrics.render().unwrap()).unwrap();
        assert!(rendered.contains("arb_opportunities_total 1"));
        assert!(rendered.contains("arb_trades_total 2"));
        assert!(rendered.contains("arb_profit_usd_total 15"));
        assert!(rendered.contains("api_latency_seconds"));
    }

    #[tokio::test]
    async fn scrape_endpoint_serves_text_format() {
        let metrics = Arc::new(Metrics::new().unwrap());
        metrics.record_opportunity();

        let req = Request::builder()
            .method(Method::GET)
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let res = handle(req, &metrics);
        assert_eq!(res.status(), StatusCode::OK);

        let req = Request::builder()
            .method(Method::GET)
            .uri("/other")
            .body(Body::empty())
            .unwrap();
        assert_eq!(handle(req, &metrics).status(), StatusCode::NOT_FOUND);
    }
}
