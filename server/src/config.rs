//! Server Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use hw_common::Snowflake;

/// Default REST base URL of the platform API.
pub const DEFAULT_API_BASE_URL: &str = "https://discord.com/api/v10";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080")
    pub bind_address: String,

    /// Application (bot user) id
    pub application_id: Snowflake,

    /// Hex-encoded Ed25519 public key used to verify inbound interactions
    pub public_key: String,

    /// Bot token, including the mandatory "Bot " prefix
    pub bot_token: String,

    /// REST base URL (default: platform v10 API)
    pub api_base_url: String,

    /// Upper bound for armed wait timeouts in seconds (default: 3)
    pub wait_timeout_ceiling_secs: u64,

    /// Extra seconds added to every server-imposed lockout (default: 5)
    pub rate_limit_safety_margin_secs: u64,

    /// Total attempts per REST request (default: 3)
    pub rest_max_attempts: u32,

    /// Base delay between REST attempts in milliseconds, multiplied by the attempt number (default: 250)
    pub rest_retry_base_delay_ms: u64,

    /// Per-request HTTP timeout in seconds (default: 10)
    pub rest_timeout_secs: u64,

    /// Upload registered commands on startup (default: false)
    pub sync_commands: bool,

    /// Guilds to upload commands to; empty means a global upload
    pub sync_guild_ids: Vec<Snowflake>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let application_id = env::var("APPLICATION_ID")
            .context("APPLICATION_ID must be set")?
            .parse()
            .context("APPLICATION_ID must be a numeric id")?;

        let sync_guild_ids = match env::var("SYNC_GUILD_IDS") {
            Ok(raw) => parse_id_list(&raw)
                .context("SYNC_GUILD_IDS must be comma-separated numeric ids")?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            application_id,
            public_key: env::var("PUBLIC_KEY").context("PUBLIC_KEY must be set")?,
            bot_token: env::var("BOT_TOKEN").context("BOT_TOKEN must be set")?,
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.into()),
            wait_timeout_ceiling_secs: env::var("WAIT_TIMEOUT_CEILING_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            rate_limit_safety_margin_secs: env::var("RATE_LIMIT_SAFETY_MARGIN_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            rest_max_attempts: env::var("REST_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(3),
            rest_retry_base_delay_ms: env::var("REST_RETRY_BASE_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(250),
            rest_timeout_secs: env::var("REST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            sync_commands: env::var("SYNC_COMMANDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            sync_guild_ids,
        })
    }

    /// Ceiling applied to armed wait timeouts.
    #[must_use]
    pub const fn wait_timeout_ceiling(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_ceiling_secs)
    }

    /// Margin added to server-imposed lockouts.
    #[must_use]
    pub const fn rate_limit_safety_margin(&self) -> Duration {
        Duration::from_secs(self.rate_limit_safety_margin_secs)
    }

    /// Base delay between REST attempts.
    #[must_use]
    pub const fn rest_retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.rest_retry_base_delay_ms)
    }

    /// Create a default configuration for testing.
    ///
    /// The public key is left empty for the test helpers to fill in from
    /// their own signing key; the API base URL points at a discard port.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".into(),
            application_id: Snowflake(1),
            public_key: String::new(),
            bot_token: "Bot test-token".into(),
            api_base_url: "http://127.0.0.1:9".into(),
            wait_timeout_ceiling_secs: 3,
            rate_limit_safety_margin_secs: 0,
            rest_max_attempts: 3,
            rest_retry_base_delay_ms: 1,
            rest_timeout_secs: 1,
            sync_commands: false,
            sync_guild_ids: Vec::new(),
        }
    }
}

/// Parses a comma-separated id list, skipping empty entries.
fn parse_id_list(raw: &str) -> std::result::Result<Vec<Snowflake>, hw_common::Error> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::parse)
        .collect()
}
