//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Region polygon data.
    #[serde(default)]
    pub regions: RegionsConfig,

    /// Upstream feed polling.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Event store retention.
    #[serde(default)]
    pub store: StoreConfig,

    /// Subscriber fan-out.
    #[serde(default)]
    pub hub: HubConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Location of the region document loaded at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionsConfig {
    /// Path to the JSON region document.
    #[serde(default = "default_regions_path")]
    pub path: String,
}

/// Feed polling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Seconds between polling cycles.
    #[serde(default = "default_fetch_interval_secs")]
    pub fetch_interval_secs: u64,

    /// Per-request timeout for upstream feeds.
    #[serde(default = "default_feed_timeout_secs")]
    pub feed_timeout_secs: u64,

    /// Feeds to poll, by source name.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
}

/// Event store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Events older than this many seconds are evicted.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,

    /// Seconds between eviction sweeps.
    #[serde(default = "default_eviction_interval_secs")]
    pub eviction_interval_secs: u64,

    /// Buffer size of the new-event stream feeding the hub.
    #[serde(default = "default_notify_capacity")]
    pub notify_capacity: usize,
}

/// Subscriber hub configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Per-session outbound queue size. A full queue evicts the session.
    #[serde(default = "default_session_queue_capacity")]
    pub session_queue_capacity: usize,

    /// Seconds allowed for sessions and the server to close on shutdown.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "sismo_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8080
}

fn default_regions_path() -> String {
    "data/regions.json".to_string()
}

fn default_fetch_interval_secs() -> u64 {
    120
}

fn default_feed_timeout_secs() -> u64 {
    30
}

fn default_sources() -> Vec<String> {
    vec!["usgs".to_string(), "geofon".to_string(), "sgc".to_string()]
}

fn default_max_age_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_eviction_interval_secs() -> u64 {
    60 * 60
}

fn default_notify_capacity() -> usize {
    sismo_store::DEFAULT_NOTIFY_CAPACITY
}

fn default_session_queue_capacity() -> usize {
    crate::hub::DEFAULT_SESSION_QUEUE_CAPACITY
}

fn default_shutdown_grace_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            path: default_regions_path(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            fetch_interval_secs: default_fetch_interval_secs(),
            feed_timeout_secs: default_feed_timeout_secs(),
            sources: default_sources(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age_secs(),
            eviction_interval_secs: default_eviction_interval_secs(),
            notify_capacity: default_notify_capacity(),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            session_queue_capacity: default_session_queue_capacity(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl IngestConfig {
    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.fetch_interval_secs.max(1))
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs.max(1))
    }
}

impl StoreConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn eviction_interval(&self) -> Duration {
        Duration::from_secs(self.eviction_interval_secs.max(1))
    }

    /// New-event stream buffer, at least one slot.
    pub fn notify_capacity(&self) -> usize {
        self.notify_capacity.max(1)
    }
}

impl HubConfig {
    /// Per-session queue size, at least one slot.
    pub fn session_queue_capacity(&self) -> usize {
        self.session_queue_capacity.max(1)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `SISMO_HOST` overrides `server.host`
/// - `SISMO_PORT` overrides `server.port`
/// - `SISMO_REGIONS_PATH` overrides `regions.path`
/// - `SISMO_FETCH_INTERVAL_SECS` overrides `ingest.fetch_interval_secs`
/// - `SISMO_MAX_AGE_SECS` overrides `store.max_age_secs`
/// - `SISMO_LOG_LEVEL` overrides `logging.level`
/// - `SISMO_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(parsed) = var("SISMO_HOST").and_then(|v| v.parse().ok()) {
        config.server.host = parsed;
    }
    if let Some(parsed) = var("SISMO_PORT").and_then(|v| v.parse().ok()) {
        config.server.port = parsed;
    }
    if let Some(path) = var("SISMO_REGIONS_PATH") {
        config.regions.path = path;
    }
    if let Some(parsed) = var("SISMO_FETCH_INTERVAL_SECS").and_then(|v| v.parse().ok()) {
        config.ingest.fetch_interval_secs = parsed;
    }
    if let Some(parsed) = var("SISMO_MAX_AGE_SECS").and_then(|v| v.parse().ok()) {
        config.store.max_age_secs = parsed;
    }
    if let Some(level) = var("SISMO_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("SISMO_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}
