// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod ingest;
pub mod notify;
pub mod queue;
pub mod registry;
pub mod relay;
pub mod rules;
pub mod scheduler;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::relay::{PollReport, Relay};
pub use crate::rules::{PostRecord, Rule};

use tracing::{info, warn};

/// Run the relay described by `cfg` until Ctrl-C, or a single debug poll
/// when `cfg.debug` is set.
pub async fn run(cfg: config::RelayConfig) -> anyhow::Result<()> {
    let relay = Relay::from_config(&cfg, chrono::Utc::now())?;

    if cfg.debug {
        info!("debug mode: single poll from epoch zero");
        scheduler::run_debug_once(relay).await;
        return Ok(());
    }

    let sched = scheduler::SchedulerCfg::from_config(&cfg);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = ?e, "cannot listen for ctrl-c, running until killed");
            std::future::pending::<()>().await;
        }
    };
    let relay = scheduler::run_until(relay, sched, shutdown).await;
    info!(dropped = relay.queue().len(), "relay stopped");
    Ok(())
}
