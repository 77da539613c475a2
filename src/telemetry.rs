//! Tracing subscriber setup and metric descriptions.

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("relay_polls_total", "Completed poll cycles.");
        describe_counter!("relay_feed_errors_total", "Feed fetch/parse errors.");
        describe_counter!("relay_posts_queued_total", "Posts appended to the queue.");
        describe_counter!(
            "relay_posts_dispatched_total",
            "Posts removed from the queue and handed to the messenger."
        );
        describe_counter!(
            "relay_send_failures_total",
            "Messenger sends that returned an error."
        );
        describe_gauge!("relay_queue_depth", "Posts waiting for dispatch.");
        describe_histogram!("relay_fetch_ms", "Feed fetch + parse time in milliseconds.");
    });
}

/// Install the subscriber. `RUST_LOG` overrides the default filter;
/// `RELAY_LOG_JSON=1` switches to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("imageboard_relay=info,warn"));

    let json = std::env::var("RELAY_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

/// Expose Prometheus metrics over HTTP on `addr`.
pub fn install_prometheus(addr: &str) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid metrics_listen address {addr}"))?;
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("prometheus: install exporter")?;
    tracing::info!(%addr, "prometheus exporter listening");
    Ok(())
}
