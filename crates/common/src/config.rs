//! Application configuration.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Reconciliation engine thresholds.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
    /// Periodic pass scheduling.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Thresholds used by the alert detectors.
///
/// All windows are expressed in whole minutes relative to the pass clock.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReconciliationConfig {
    /// Departure-soon alerts fire when departure is at most this far away.
    #[serde(default = "default_departure_window")]
    pub departure_window_minutes: i64,
    /// Departure-soon alerts at or below this many minutes are `high`.
    #[serde(default = "default_departure_high")]
    pub departure_high_minutes: i64,
    /// Estimated closing time offset from the scheduled departure, used when a
    /// flight has no explicit gate-closing timestamp.
    #[serde(default = "default_closing_offset")]
    pub closing_offset_minutes: i64,
    /// Closing alerts fire when closing is at most this far away.
    #[serde(default = "default_closing_window")]
    pub closing_window_minutes: i64,
    /// Closing alerts at or below this many minutes are `urgent`.
    #[serde(default = "default_closing_urgent")]
    pub closing_urgent_minutes: i64,
    /// Closing alerts at or below this many minutes are `high`.
    #[serde(default = "default_closing_high")]
    pub closing_high_minutes: i64,
    /// Missing-bag alerts become `urgent` when departure is this close.
    #[serde(default = "default_missing_urgent")]
    pub missing_urgent_minutes: i64,
    /// Lifetime of closing, incomplete-set and missing-bag notifications.
    #[serde(default = "default_notification_ttl")]
    pub notification_ttl_hours: i64,
    /// Upper bound for the store reads of a single flight.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_secs: u64,
    /// Upper bound for a whole pass when the caller supplies no deadline.
    #[serde(default = "default_pass_deadline")]
    pub pass_deadline_secs: u64,
}

impl ReconciliationConfig {
    /// Timeout applied to the store reads of one flight.
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Default deadline for a full pass.
    #[must_use]
    pub const fn pass_deadline(&self) -> Duration {
        Duration::from_secs(self.pass_deadline_secs)
    }
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            departure_window_minutes: default_departure_window(),
            departure_high_minutes: default_departure_high(),
            closing_offset_minutes: default_closing_offset(),
            closing_window_minutes: default_closing_window(),
            closing_urgent_minutes: default_closing_urgent(),
            closing_high_minutes: default_closing_high(),
            missing_urgent_minutes: default_missing_urgent(),
            notification_ttl_hours: default_notification_ttl(),
            store_timeout_secs: default_store_timeout(),
            pass_deadline_secs: default_pass_deadline(),
        }
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the server runs passes on its own.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval between reconciliation passes (default: 30 seconds).
    #[serde(default = "default_pass_interval")]
    pub pass_interval_secs: u64,
    /// Interval between expired-notification purges (default: 1 hour).
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pass_interval_secs: default_pass_interval(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_departure_window() -> i64 {
    120
}

const fn default_departure_high() -> i64 {
    60
}

const fn default_closing_offset() -> i64 {
    30
}

const fn default_closing_window() -> i64 {
    30
}

const fn default_closing_urgent() -> i64 {
    15
}

const fn default_closing_high() -> i64 {
    30
}

const fn default_missing_urgent() -> i64 {
    60
}

const fn default_notification_ttl() -> i64 {
    24
}

const fn default_store_timeout() -> u64 {
    10
}

const fn default_pass_deadline() -> u64 {
    25
}

const fn default_pass_interval() -> u64 {
    30
}

const fn default_cleanup_interval() -> u64 {
    3600
}

const fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `BAGGAGE_ENV`)
    /// 3. Environment variables with `BAGGAGE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("BAGGAGE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("BAGGAGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("BAGGAGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
