//! Configuration for the depth synchronization engine.
//!
//! This module provides the [`Config`] struct for selecting upstream
//! endpoints and tuning the engine.

use std::time::Duration;

use crate::client::stream::ReconnectConfig;

/// Largest snapshot depth the REST endpoint accepts
pub const MAX_SNAPSHOT_LIMIT: u32 = 1_000;

/// Snapshot depth used when `init` is called without a limit
pub const DEFAULT_SNAPSHOT_LIMIT: u32 = MAX_SNAPSHOT_LIMIT;

/// Default cap on updates queued while waiting for a snapshot
pub const DEFAULT_MAX_BUFFERED_UPDATES: usize = 10_000;

/// Upstream environment (production or spot testnet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Production market data
    #[default]
    Production,
    /// Spot testnet
    Testnet,
}

impl Environment {
    /// Get the base URL for the REST API
    pub fn rest_base_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://api.binance.com/api/v3",
            Environment::Testnet => "https://testnet.binance.vision/api/v3",
        }
    }

    /// Get the base URL for raw WebSocket streams
    pub fn stream_base_url(&self) -> &'static str {
        match self {
            Environment::Production => "wss://stream.binance.com:9443/ws",
            Environment::Testnet => "wss://stream.testnet.binance.vision/ws",
        }
    }
}

/// Configuration for the snapshot client, diff stream and manager
///
/// # Example
///
/// ```rust
/// use binance_depth_sync::Config;
/// use binance_depth_sync::config::Environment;
///
/// let config = Config::new();
///
/// // Use the spot testnet
/// let testnet = Config::new().with_environment(Environment::Testnet);
///
/// // Custom timeout and buffer cap
/// let config = Config::new()
///     .with_timeout(std::time::Duration::from_secs(30))
///     .with_max_buffered_updates(2_000);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    environment: Environment,

    /// Explicit REST base URL, overriding the environment
    rest_base_url: Option<String>,

    /// Explicit stream base URL, overriding the environment
    stream_base_url: Option<String>,

    /// HTTP request and WebSocket connect timeout
    timeout: Duration,

    default_limit: u32,

    max_buffered_updates: usize,

    reconnect: ReconnectConfig,
}

impl Config {
    /// Create a configuration with production endpoints and default tuning
    pub fn new() -> Self {
        Self {
            environment: Environment::default(),
            rest_base_url: None,
            stream_base_url: None,
            timeout: Duration::from_secs(10),
            default_limit: DEFAULT_SNAPSHOT_LIMIT,
            max_buffered_updates: DEFAULT_MAX_BUFFERED_UPDATES,
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Set the upstream environment
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Override the REST base URL (e.g. a local mirror)
    #[must_use]
    pub fn with_rest_base_url(mut self, url: impl Into<String>) -> Self {
        self.rest_base_url = Some(url.into());
        self
    }

    /// Override the stream base URL
    #[must_use]
    pub fn with_stream_base_url(mut self, url: impl Into<String>) -> Self {
        self.stream_base_url = Some(url.into());
        self
    }

    /// Set the HTTP request / WebSocket connect timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the snapshot depth used when `init` gets no explicit limit
    ///
    /// The value is validated when it is used, not here.
    #[must_use]
    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit;
        self
    }

    /// Set the cap on updates buffered while a snapshot is pending
    #[must_use]
    pub fn with_max_buffered_updates(mut self, max: usize) -> Self {
        self.max_buffered_updates = max.max(1);
        self
    }

    /// Set the stream reconnection policy
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Get the environment
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Get the REST API base URL
    pub fn rest_base_url(&self) -> &str {
        self.rest_base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.rest_base_url())
    }

    /// Get the stream base URL
    pub fn stream_base_url(&self) -> &str {
        self.stream_base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.stream_base_url())
    }

    /// Get the timeout duration
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the default snapshot limit
    pub fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// Get the buffered update cap
    pub fn max_buffered_updates(&self) -> usize {
        self.max_buffered_updates
    }

    /// Get the reconnection policy
    pub fn reconnect(&self) -> &ReconnectConfig {
        &self.reconnect
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
