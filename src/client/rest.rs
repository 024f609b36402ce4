//! HTTP REST client for order book snapshots.
//!
//! This module provides the [`RestClient`] for fetching depth snapshots and
//! the [`SnapshotSource`] trait the manager consumes.
//!
//! # Example
//!
//! ```rust,no_run
//! use binance_depth_sync::Config;
//! use binance_depth_sync::client::RestClient;
//!
//! # async fn example() -> binance_depth_sync::Result<()> {
//! let rest = RestClient::new(&Config::new())?;
//! let book = rest.fetch_snapshot("BTCUSDT", 100).await?;
//! println!("snapshot at {}", book.last_update_id);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::{Config, MAX_SNAPSHOT_LIMIT};
use crate::error::{ApiError, Error};
use crate::orderbook::OrderBookState;
use crate::types::DepthSnapshot;

/// Anything that can produce a full order book snapshot
///
/// Implementations must not retry internally; retry policy belongs to the
/// manager.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch a snapshot of `symbol` with at most `limit` levels per side
    async fn fetch_snapshot(&self, symbol: &str, limit: u32) -> Result<OrderBookState, Error>;
}

/// Check that a snapshot depth is within `[1, MAX_SNAPSHOT_LIMIT]`
pub fn validate_limit(limit: u32) -> Result<u32, Error> {
    if limit == 0 || limit > MAX_SNAPSHOT_LIMIT {
        return Err(Error::InvalidArgument(format!(
            "invalid limit {}: must be between 1 and {}",
            limit, MAX_SNAPSHOT_LIMIT
        )));
    }
    Ok(limit)
}

/// HTTP client for the depth snapshot endpoint
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    /// Create a new REST client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be initialized.
    pub fn new(config: &Config) -> Result<Self, Error> {
        Url::parse(config.rest_base_url())?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("binance-depth-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.rest_base_url().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a depth snapshot and build an [`OrderBookState`] from it
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `limit` is out of range (no request is made)
    /// - [`Error::Upstream`] / [`Error::RateLimited`] on a non-success status
    /// - [`Error::Http`] / [`Error::Json`] on transport or decoding failures
    pub async fn fetch_snapshot(&self, symbol: &str, limit: u32) -> Result<OrderBookState, Error> {
        validate_limit(limit)?;
        let symbol = symbol.to_uppercase();

        let snapshot: DepthSnapshot = self
            .get("/depth", &[("symbol", symbol.as_str()), ("limit", &limit.to_string())])
            .await?;

        debug!(
            symbol = %symbol,
            last_update_id = snapshot.last_update_id,
            bids = snapshot.bids.len(),
            asks = snapshot.asks.len(),
            "fetched depth snapshot"
        );

        Ok(OrderBookState::from_snapshot(symbol, &snapshot))
    }

    /// Make a GET request to the API
    ///
    /// # Arguments
    ///
    /// * `path` - API path (without base URL)
    /// * `query` - Query string parameters
    ///
    /// # Returns
    ///
    /// Deserialized response body
    pub async fn get<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = Url::parse_with_params(&format!("{}{}", self.base_url, path), query)?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Handle the HTTP response, checking for errors
    async fn handle_response<T>(&self, response: reqwest::Response) -> Result<T, Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();

        // 429 = request weight exceeded, 418 = IP banned after ignoring 429s
        if status.as_u16() == 429 || status.as_u16() == 418 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(|secs| secs * 1_000);

            return Err(Error::RateLimited {
                retry_after_ms: retry_after,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            // Error bodies look like {"code": -1121, "msg": "Invalid symbol."}
            if let Ok(error_response) = serde_json::from_str::<serde_json::Value>(&body) {
                let message = error_response
                    .get("msg")
                    .or_else(|| error_response.get("message"))
                    .and_then(|v| v.as_str())
                    .unwrap_or(&body)
                    .to_string();

                let code = error_response.get("code").and_then(|v| v.as_i64());

                return Err(Error::Upstream(ApiError {
                    status: status.as_u16(),
                    code,
                    message,
                }));
            }

            return Err(Error::Upstream(ApiError::new(status.as_u16(), body)));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(Error::from)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SnapshotSource for RestClient {
    async fn fetch_snapshot(&self, symbol: &str, limit: u32) -> Result<OrderBookState, Error> {
        RestClient::fetch_snapshot(self, symbol, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_limit_bounds() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(1_000).is_ok());
        assert!(matches!(validate_limit(0), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            validate_limit(5_000),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let config = Config::new().with_rest_base_url("not a url");
        assert!(matches!(RestClient::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = Config::new().with_rest_base_url("http://127.0.0.1:1/api/v3/");
        let client = RestClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:1/api/v3");
    }

    #[tokio::test]
    async fn test_invalid_limit_fails_before_request() {
        // Port 1 is never listening; reaching the network would yield Error::Http
        let config = Config::new().with_rest_base_url("http://127.0.0.1:1/api/v3");
        let client = RestClient::new(&config).unwrap();

        let result = client.fetch_snapshot("BTCUSDT", 5_000).await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_is_upstream_error() {
        let config = Config::new().with_rest_base_url("http://127.0.0.1:1/api/v3");
        let client = RestClient::new(&config).unwrap();

        let err = client.fetch_snapshot("BTCUSDT", 10).await.unwrap_err();
        assert!(err.is_upstream(), "unexpected error: {err}");
    }
}
