//! imageboard-relay: binary entrypoint.
//! Usage: `imageboard-relay [CONFIG_PATH]` (defaults to $RELAY_CONFIG_PATH,
//! then `config/relay.toml`).

use std::path::PathBuf;

use imageboard_relay::config::{load_config_default, load_config_from};
use imageboard_relay::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    telemetry::init_tracing();

    let cfg = match std::env::args().nth(1) {
        Some(p) => load_config_from(&PathBuf::from(p))?,
        None => load_config_default()?,
    };

    if let Some(addr) = cfg.metrics_listen.as_deref() {
        telemetry::install_prometheus(addr)?;
    }

    imageboard_relay::run(cfg).await
}
