// src/scheduler.rs
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::config::RelayConfig;
use crate::relay::Relay;

#[derive(Clone, Copy, Debug)]
pub struct SchedulerCfg {
    pub poll_every: Duration,
    pub dispatch_every: Duration,
}

impl SchedulerCfg {
    pub fn from_config(cfg: &RelayConfig) -> Self {
        Self {
            poll_every: Duration::from_secs(cfg.poll_interval_mins * 60),
            dispatch_every: Duration::from_secs(cfg.bot.dispatch_interval_secs),
        }
    }
}

/// Drive both timers on one task until `shutdown` resolves. Each timer
/// first fires one full period after start. A poll cycle runs to completion
/// before the next dispatch tick is served, and before `shutdown` is
/// observed: stopping can wait up to sources x `fetch_timeout_secs`.
pub async fn run_until<F>(mut relay: Relay, cfg: SchedulerCfg, shutdown: F) -> Relay
where
    F: Future<Output = ()>,
{
    let start = Instant::now();
    let mut poll = interval_at(start + cfg.poll_every, cfg.poll_every);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut dispatch = interval_at(start + cfg.dispatch_every, cfg.dispatch_every);
    dispatch.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        sources = relay.sources().len(),
        poll_secs = cfg.poll_every.as_secs(),
        dispatch_secs = cfg.dispatch_every.as_secs(),
        "scheduler started"
    );

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!(pending = relay.queue().len(), "scheduler stopping");
                break;
            }
            _ = poll.tick() => {
                relay.poll_once().await;
            }
            _ = dispatch.tick() => {
                relay.dispatch_once().await;
            }
        }
    }
    relay
}

/// Debug mode: poll once, log what would be sent, never dispatch.
pub async fn run_debug_once(mut relay: Relay) -> Relay {
    let report = relay.poll_once().await;
    for (i, post) in relay.queue().iter().enumerate() {
        tracing::info!(
            n = i + 1,
            caption = %post.caption,
            preview = %post.preview_url,
            full = %post.full_url,
            origin = %post.origin_url,
            "queued post"
        );
    }
    tracing::info!(
        polled = report.polled,
        failed = report.failed,
        queued = report.queued,
        "debug poll finished, dispatcher not started"
    );
    relay
}
