// src/config/relay.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Deserializer};
use std::{env, fs, path::Path, path::PathBuf};

pub const ENV_CONFIG_PATH: &str = "RELAY_CONFIG_PATH";
pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const DEFAULT_CONFIG_PATH: &str = "config/relay.toml";

fn default_poll_minutes() -> u64 {
    10
}
fn default_dispatch_secs() -> u64 {
    30
}
fn default_fetch_timeout_secs() -> u64 {
    30
}
fn default_send_timeout_secs() -> u64 {
    10
}
fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Poll interval in minutes.
    #[serde(rename = "interval", default = "default_poll_minutes")]
    pub poll_interval_mins: u64,
    /// One immediate poll from epoch zero, no dispatching.
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// e.g. "0.0.0.0:9000"; Prometheus exporter stays off when unset.
    #[serde(default)]
    pub metrics_listen: Option<String>,
    pub bot: BotConfig,
    #[serde(rename = "feed", default)]
    pub feeds: Vec<FeedConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// "ENV" means: read from TELEGRAM_BOT_TOKEN
    pub token: String,
    #[serde(deserialize_with = "string_or_int")]
    pub chat: String,
    /// Dispatch interval in seconds.
    #[serde(rename = "interval", default = "default_dispatch_secs")]
    pub dispatch_interval_secs: u64,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Per-request timeout for sendPhoto, seconds.
    #[serde(default = "default_send_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    /// Kept raw so unknown types are skipped at registration, not rejected here.
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

// numeric chat ids (-100...) are common in hand-written configs
fn string_or_int<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Chat {
        Int(i64),
        Str(String),
    }
    Ok(match Chat::deserialize(d)? {
        Chat::Int(i) => i.to_string(),
        Chat::Str(s) => s,
    })
}

impl RelayConfig {
    pub fn parse(s: &str) -> Result<Self> {
        let mut cfg: RelayConfig = toml::from_str(s).context("parsing relay config toml")?;

        if cfg.poll_interval_mins == 0 {
            bail!("interval (minutes) must be > 0");
        }
        if cfg.bot.dispatch_interval_secs == 0 {
            bail!("bot.interval (seconds) must be > 0");
        }
        if cfg.fetch_timeout_secs == 0 {
            cfg.fetch_timeout_secs = default_fetch_timeout_secs();
        }
        if cfg.bot.timeout_secs == 0 {
            cfg.bot.timeout_secs = default_send_timeout_secs();
        }
        cfg.bot.api_base = cfg.bot.api_base.trim_end_matches('/').to_string();

        // debug mode never sends, so it runs without a token
        if cfg.debug {
            return Ok(cfg);
        }
        if cfg.bot.token.trim().eq_ignore_ascii_case("env") {
            cfg.bot.token = env::var(ENV_BOT_TOKEN)
                .map_err(|_| anyhow!("Missing {ENV_BOT_TOKEN} env var"))?;
        }
        if cfg.bot.token.trim().is_empty() {
            bail!("bot.token is empty");
        }

        Ok(cfg)
    }
}

pub fn load_config_from(path: &Path) -> Result<RelayConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading relay config from {}", path.display()))?;
    RelayConfig::parse(&content).with_context(|| format!("in {}", path.display()))
}

/// Resolve the config path: $RELAY_CONFIG_PATH, then config/relay.toml.
pub fn load_config_default() -> Result<RelayConfig> {
    let path = env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    if !path.exists() {
        bail!("relay config not found at {}", path.display());
    }
    load_config_from(&path)
}
