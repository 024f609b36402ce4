//! # binance-depth-sync
//!
//! Keeps a locally consistent Binance order book by stitching a REST depth
//! snapshot onto the diff depth WebSocket stream, and republishes every
//! update to downstream listeners.
//!
//! ## Features
//!
//! - **Snapshot Client** - `GET /depth` with upstream error mapping
//! - **Diff Stream** - reconnects forever with a jittered delay
//! - **Reconciliation** - obsolete / bridging / gap classification of updates
//! - **Synchronization** - buffers until the snapshot lands, resyncs on gaps,
//!   and never issues two snapshot requests at once
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use binance_depth_sync::broadcast::ChannelListener;
//! use binance_depth_sync::{Config, OrderBookManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), binance_depth_sync::Error> {
//!     let listener = ChannelListener::new(128);
//!     let mut books = listener.subscribe();
//!
//!     let manager = OrderBookManager::new(Config::new(), Arc::new(listener))?;
//!     manager.init("BTCUSDT", None).await?;
//!
//!     while let Ok(book) = books.recv().await {
//!         println!("{} @ {}: {:?}", book.symbol, book.last_update_id, book.best_bid());
//!     }
//!
//!     manager.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`client`] - REST snapshot client and diff stream subscriber
//! - [`orderbook`] - book state, reconciliation rules and the manager
//! - [`broadcast`] - listener trait for downstream fan-out
//! - [`types`] - wire types for snapshots and depth updates
//! - [`config`] - endpoints and tuning
//! - [`error`] - error types for the crate
//!
//! ## Price Representation
//!
//! Prices and quantities are kept as the exact decimal strings the exchange
//! sends. Updates address levels by that string, so no float rounding can
//! leave a level behind that should have been removed.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod broadcast;
pub mod client;
pub mod config;
pub mod error;
pub mod orderbook;
pub mod types;

// Re-export main types at crate root for convenience
pub use config::Config;
pub use error::Error;
pub use orderbook::{OrderBookManager, OrderBookState, SyncPhase};

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_config_creation() {
        let config = Config::new();
        assert_eq!(config.default_limit(), 1_000);
    }

    #[test]
    fn test_manager_builds_from_default_config() {
        let manager = OrderBookManager::new(Config::new(), Arc::new(broadcast::NoopListener));
        assert!(manager.is_ok());
        assert_eq!(manager.unwrap().phase(), SyncPhase::Unsynced);
    }
}
