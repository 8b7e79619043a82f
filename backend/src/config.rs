//! Server configuration loaded from environment variables.
//!
//! All settings have defaults so the server starts with zero configuration
//! for local development.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP API server.
    /// Env: `HTTP_ADDR`
    /// Default: `127.0.0.1:3000`
    pub http_addr: SocketAddr,

    /// Bot username used to build referral links.
    /// Env: `BOT_USERNAME`
    /// Default: `"secretvalentinebot"`
    pub bot_username: String,

    /// Promotional unlock instant (RFC 3339). Cards created while this is in
    /// the future are pinned to it; unset (or past) means new cards unlock
    /// immediately.
    /// Env: `PROMO_UNLOCK_AT`
    /// Default: unset.
    pub promo_unlock_at: Option<DateTime<Utc>>,

    /// Simulated notification round-trip latency.
    /// Env: `NOTIFY_LATENCY_MS`
    /// Default: 150 ms.
    pub notify_latency: Duration,

    /// Upper bound on a notification delivery attempt.
    /// Env: `NOTIFY_TIMEOUT_MS`
    /// Default: 2000 ms.
    pub notify_timeout: Duration,

    /// Admin API bearer token. Required on /admin/* endpoints when set.
    /// Env: `ADMIN_TOKEN`
    /// Default: unset (admin API open, development only).
    pub admin_token: Option<String>,

    /// Whether to seed the store with the demo valentines.
    /// Env: `SEED_DEMO_DATA` (true/false)
    /// Default: `true`
    pub seed_demo_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([127, 0, 0, 1], 3000).into(),
            bot_username: "secretvalentinebot".to_string(),
            promo_unlock_at: None,
            notify_latency: Duration::from_millis(150),
            notify_timeout: Duration::from_millis(2000),
            admin_token: None,
            seed_demo_data: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Ok(name) = std::env::var("BOT_USERNAME") {
            if !name.is_empty() {
                config.bot_username = name;
            }
        }

        if let Ok(raw) = std::env::var("PROMO_UNLOCK_AT") {
            match DateTime::parse_from_rfc3339(raw.trim()) {
                Ok(dt) => config.promo_unlock_at = Some(dt.with_timezone(&Utc)),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Invalid PROMO_UNLOCK_AT, ignoring");
                }
            }
        }

        if let Ok(val) = std::env::var("NOTIFY_LATENCY_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                config.notify_latency = Duration::from_millis(ms);
            }
        }

        if let Ok(val) = std::env::var("NOTIFY_TIMEOUT_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                config.notify_timeout = Duration::from_millis(ms);
            }
        }

        if let Ok(token) = std::env::var("ADMIN_TOKEN") {
            if !token.is_empty() {
                config.admin_token = Some(token);
            }
        }

        if let Ok(val) = std::env::var("SEED_DEMO_DATA") {
            config.seed_demo_data = val != "false" && val != "0";
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}
